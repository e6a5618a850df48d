use std::rc::Rc;

/// Receives events emitted by a [`Subject`].
///
/// The source is handed back on every notification so observers can read
/// whatever state they need instead of receiving it inside the event.
pub trait Observer<S: Subject<E> + ?Sized, E: Clone> {
    fn update(&self, source: &S, event: E);
}

pub trait Subject<E: Clone> {
    fn register_observer(&mut self, observer: Rc<dyn Observer<Self, E>>);
    fn unregister_observer(&mut self, observer: Rc<dyn Observer<Self, E>>);
    fn notify_observers(&self, event: E);
}

/// Observer list a subject keeps; observers are compared by pointer.
pub type SharedObservers<S, E> = Vec<Rc<dyn Observer<S, E>>>;

/// Removes `observer` from `observers`, returning whether it was registered.
pub fn remove_observer<S, E>(
    observers: &mut SharedObservers<S, E>,
    observer: &Rc<dyn Observer<S, E>>,
) -> bool
where
    S: Subject<E>,
    E: Clone,
{
    let len = observers.len();
    observers.retain(|obs| !Rc::ptr_eq(obs, observer));
    observers.len() != len
}
