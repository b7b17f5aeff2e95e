use crate::object::Object;
use crate::shared_list::SharedList;
use std::collections::BTreeMap;
use std::mem;

/// A chain of scopes. Cloning shares every frame, so a function's closure and
/// the scope it was defined in see each other's writes.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: SharedList<BTreeMap<String, Object>>,
}

impl Environment {
    pub fn new() -> Environment {
        let mut frames = SharedList::new();
        frames.push(BTreeMap::new());
        Environment { frames }
    }

    /// A fresh innermost scope whose parent chain is this environment.
    pub fn new_child(&self) -> Environment {
        let mut frames = self.frames.clone();
        frames.push(BTreeMap::new());
        Environment { frames }
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.frames.find_map(|frame| frame.get(name).cloned())
    }

    /// Binds `name` in the innermost scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Object) {
        let replaced = self
            .frames
            .peek_mut()
            .and_then(|mut frame| frame.insert(name.to_string(), value));
        // The old value may own a closure over this frame; release it only
        // after the frame is no longer borrowed.
        drop(replaced);
    }

    /// Overwrites the nearest existing binding of `name`, or defines it in the
    /// innermost scope when no scope has it.
    pub fn assign(&mut self, name: &str, value: Object) {
        let mut pending = Some(value);
        let replaced = self.frames.find_map_mut(|frame| {
            let slot = frame.get_mut(name)?;
            pending.take().map(|value| mem::replace(slot, value))
        });
        drop(replaced);
        if let Some(value) = pending {
            self.define(name, value);
        }
    }

    /// Number of scopes from the innermost frame to the root.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn equals(&self, other: &Environment) -> bool {
        self.frames.equals(&other.frames)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod environment_tests {
    use crate::environment::Environment;
    use crate::object::Object;
    use pretty_assertions::assert_eq;

    #[test]
    fn define_and_get() {
        let mut env = Environment::new();
        assert_eq!(env.get("a"), None);
        env.define("a", Object::Integer(1));
        assert_eq!(env.get("a"), Some(Object::Integer(1)));
        env.define("a", Object::Integer(2));
        assert_eq!(env.get("a"), Some(Object::Integer(2)));
    }

    #[test]
    fn children_see_parents() {
        let mut root = Environment::new();
        root.define("a", Object::Integer(1));
        let child = root.new_child();
        assert_eq!(child.get("a"), Some(Object::Integer(1)));
        assert_eq!(child.depth(), 2);
        root.define("b", Object::Integer(2));
        assert_eq!(child.get("b"), Some(Object::Integer(2)));
    }

    #[test]
    fn define_shadows_without_touching_parent() {
        let mut root = Environment::new();
        root.define("a", Object::Integer(1));
        let mut child = root.new_child();
        child.define("a", Object::Integer(2));
        assert_eq!(child.get("a"), Some(Object::Integer(2)));
        assert_eq!(root.get("a"), Some(Object::Integer(1)));
    }

    #[test]
    fn assign_mutates_nearest_binding() {
        let mut root = Environment::new();
        root.define("a", Object::Integer(69));
        let mut child = root.new_child();
        child.assign("a", Object::Integer(1));
        assert_eq!(root.get("a"), Some(Object::Integer(1)));

        child.assign("local", Object::Integer(5));
        assert_eq!(child.get("local"), Some(Object::Integer(5)));
        assert_eq!(root.get("local"), None);
    }

    #[test]
    fn clones_share_frames() {
        let mut env = Environment::new();
        let copy = env.clone();
        assert!(env.equals(&copy));
        assert!(!env.equals(&env.new_child()));
        env.define("x", Object::Null);
        assert_eq!(copy.get("x"), Some(Object::Null));
    }
}
