use std::cell::RefCell;
use std::rc::Rc;

pub type SubId = usize;

/// Observable value. Subscribers run synchronously on every write, in
/// subscription order, and must not write back into the same signal.
#[derive(Clone)]
pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

struct Inner<T> {
    value: T,
    subs: Vec<Option<Box<dyn Fn(&T)>>>,
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value,
            subs: Vec::new(),
        })))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    pub fn set(&self, v: T) {
        let mut inner = self.0.borrow_mut();
        inner.value = v;
        let vref = &inner.value;
        for s in inner.subs.iter().flatten() {
            s(vref);
        }
    }

    /// Writes only when the value actually changes. Returns whether it did.
    pub fn replace_if_changed(&self, v: T) -> bool
    where
        T: PartialEq,
    {
        if self.0.borrow().value == v {
            return false;
        }
        self.set(v);
        true
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        let mut inner = self.0.borrow_mut();
        inner.subs.push(Some(Box::new(f)));
        inner.subs.len() - 1
    }

    pub fn unsubscribe(&self, id: SubId) {
        if let Some(slot) = self.0.borrow_mut().subs.get_mut(id) {
            *slot = None;
        }
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}
