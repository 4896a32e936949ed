use std::cell::RefCell;
use std::rc::Rc;

/// Cleanup handle, e.g. for a bound event listener.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        if let Some(f) = self.0.borrow_mut().take() {
            f()
        }
    }
}

/// Collects disposers registered during start-up and runs them in reverse
/// registration order.
#[derive(Default)]
pub struct DisposeBag {
    items: RefCell<Vec<Dispose>>,
}

impl DisposeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, d: Dispose) {
        self.items.borrow_mut().push(d);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn dispose(&self) {
        let items = std::mem::take(&mut *self.items.borrow_mut());
        for d in items.into_iter().rev() {
            d.run();
        }
    }
}
