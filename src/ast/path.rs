use serde::{Deserialize, Serialize};

/// Structural key locating a table group or column in the mapped object graph.
///
/// Paths are compared by value: `Person.address.city` registered in one scope
/// is found again by any equal path, independent of the SQL alias it renders
/// with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NavigablePath {
    pub root: String,
    #[serde(default)]
    pub steps: Vec<String>,
}

impl NavigablePath {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            steps: Vec::new(),
        }
    }

    /// Path one step further down the graph.
    pub fn append(&self, step: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step.into());
        Self {
            root: self.root.clone(),
            steps,
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.steps.is_empty() {
            return None;
        }
        let mut steps = self.steps.clone();
        steps.pop();
        Some(Self {
            root: self.root.clone(),
            steps,
        })
    }

    /// Last segment: the final step, or the root for a root path.
    pub fn local_name(&self) -> &str {
        self.steps.last().map(String::as_str).unwrap_or(&self.root)
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Display for NavigablePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)?;
        for step in &self.steps {
            write!(f, ".{}", step)?;
        }
        Ok(())
    }
}
