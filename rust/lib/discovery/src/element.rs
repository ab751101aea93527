use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Handle to the UI element a discovery came through (a link, a card, a
/// hover target).
///
/// The tracker forwards it to observers untouched. What sits inside is up to
/// the presentation layer: a DOM node wrapper in the browser, a link record
/// in the CLI, a marker in tests. Observers that know the platform type get
/// it back with [`downcast_ref`](Self::downcast_ref).
#[derive(Clone)]
pub struct ElementRef {
    element: Arc<dyn Any + Send + Sync>,
}

impl ElementRef {
    pub fn new<E: Any + Send + Sync>(element: E) -> Self {
        Self {
            element: Arc::new(element),
        }
    }

    /// The element as its platform type, or `None` if it is something else.
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.element.downcast_ref::<E>()
    }

    /// Whether the element is an `E`.
    pub fn is<E: Any>(&self) -> bool {
        self.element.is::<E>()
    }

    /// Platform type of the element.
    pub fn type_id(&self) -> TypeId {
        (*self.element).type_id()
    }

    /// Whether both handles refer to the same element, not merely equal ones.
    pub fn ptr_eq(&self, other: &ElementRef) -> bool {
        Arc::ptr_eq(&self.element, &other.element)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("type_id", &self.type_id())
            .field("handles", &Arc::strong_count(&self.element))
            .finish()
    }
}
