// Engine and monitors subscribe closures that capture an Rc back to their
// owner; destroy() breaks that cycle by releasing the subscriptions.
pub trait Destroyable {
    fn destroy(&mut self);
}
