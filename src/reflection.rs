use std::collections::HashMap;
use std::sync::Arc;

use crate::tree::Visibility;

/// What reflection knows about one method of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub visibility: Visibility,
    pub is_abstract: bool,
}

impl MethodInfo {
    pub fn new(visibility: Visibility) -> Self {
        MethodInfo {
            visibility,
            is_abstract: false,
        }
    }
}

/// Reflective handle for the class enclosing a node, resolved by the
/// surrounding system before the pass starts. Parent links are immutable
/// `Arc`s, so an ancestor chain is finite by construction and walking it
/// needs no cycle guard.
#[derive(Debug)]
pub struct ClassInfo {
    name: String,
    parent: Option<Arc<ClassInfo>>,
    methods: HashMap<String, MethodInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        ClassInfo {
            name: name.into(),
            parent: None,
            methods: HashMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: Arc<ClassInfo>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_method(mut self, name: impl Into<String>, info: MethodInfo) -> Self {
        self.methods.insert(name.into(), info);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ClassInfo>> {
        self.parent.as_ref()
    }

    /// Method declared directly on this class. A miss here says nothing
    /// about ancestors; callers keep searching up the chain.
    pub fn method(&self, name: &str) -> Option<MethodInfo> {
        self.methods.get(name).copied()
    }

    /// Walk the ancestor chain looking for a protected method of the same
    /// name. A protected match at any depth blocks narrowing; an ancestor
    /// declaring the name with another visibility does not settle the
    /// question, a more distant ancestor may still declare it protected.
    pub fn has_protected_ancestor_method(&self, method: &str) -> bool {
        let mut ancestor = self.parent.clone();
        while let Some(class) = ancestor {
            if let Some(info) = class.method(method) {
                if info.visibility == Visibility::Protected {
                    return true;
                }
            }
            ancestor = class.parent.clone();
        }
        false
    }
}
