#[cfg(test)]
use std::cell::Ref;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;

/// A persistent stack whose nodes are shared between clones. Pushing onto a
/// clone never affects the original, while mutating a shared node is visible
/// through every list that reaches it.
#[derive(Debug)]
pub struct SharedList<T> {
    head: Link<T>,
}

type Link<T> = Option<Rc<RefCell<Node<T>>>>;

#[derive(Debug)]
struct Node<T> {
    elem: T,
    next: Link<T>,
}

impl<T> Node<T> {
    fn new(elem: T, next: Link<T>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Node { elem, next }))
    }
}

impl<T> Clone for SharedList<T> {
    fn clone(&self) -> SharedList<T> {
        SharedList {
            head: self.head.as_ref().map(Rc::clone),
        }
    }
}

impl<T> SharedList<T> {
    pub fn new() -> Self {
        SharedList { head: None }
    }

    pub fn push(&mut self, elem: T) {
        self.head = Some(Node::new(elem, self.head.take()));
    }

    #[cfg(test)]
    pub fn peek(&self) -> Option<Ref<T>> {
        self.head
            .as_ref()
            .map(|node| Ref::map(node.borrow(), |node| &node.elem))
    }

    pub fn peek_mut(&mut self) -> Option<RefMut<T>> {
        self.head
            .as_ref()
            .map(|node| RefMut::map(node.borrow_mut(), |node| &mut node.elem))
    }

    // Only shared borrows here: a node may be released while a sibling list
    // holds a mutable borrow further up the chain.
    pub fn pop(&mut self) {
        if let Some(old_head) = self.head.take() {
            self.head = old_head.borrow().next.clone();
        }
    }

    /// Walks from the head and returns the first `Some` produced by `f`.
    pub fn find_map<R>(&self, mut f: impl FnMut(&T) -> Option<R>) -> Option<R> {
        let mut cursor = self.head.clone();
        while let Some(node) = cursor {
            if let Some(result) = f(&node.borrow().elem) {
                return Some(result);
            }
            cursor = node.borrow().next.clone();
        }
        None
    }

    /// Like [`SharedList::find_map`], with mutable access to each element.
    pub fn find_map_mut<R>(&mut self, mut f: impl FnMut(&mut T) -> Option<R>) -> Option<R> {
        let mut cursor = self.head.clone();
        while let Some(node) = cursor {
            if let Some(result) = f(&mut node.borrow_mut().elem) {
                return Some(result);
            }
            cursor = node.borrow().next.clone();
        }
        None
    }

    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut cursor = self.head.clone();
        while let Some(node) = cursor {
            len += 1;
            cursor = node.borrow().next.clone();
        }
        len
    }

    pub fn empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn equals(&self, other: &SharedList<T>) -> bool {
        match (&self.head, &other.head) {
            (None, None) => true,
            (Some(l), Some(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

// Unlinks iteratively so long chains do not recurse on drop.
impl<T> Drop for SharedList<T> {
    fn drop(&mut self) {
        while !self.empty() {
            self.pop();
        }
    }
}
