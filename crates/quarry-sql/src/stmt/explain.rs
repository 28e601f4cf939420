use super::Stmt;

/// EXPLAIN of a resolved statement.
#[derive(Debug, Clone)]
pub struct ExplainStmt {
    child: Box<Stmt>,
}

impl ExplainStmt {
    /// Wraps a statement.
    pub fn new(child: Stmt) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    /// Returns the explained statement.
    pub fn child(&self) -> &Stmt {
        &self.child
    }
}
