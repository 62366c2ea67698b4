//! Macros to reduce boilerplate in layer implementations

/// Implements the `as_any`/`as_any_mut` pair required by [`crate::layers::base::Layer`].
///
/// Usage, inside an `impl Layer for MyLayer` block:
/// ```ignore
/// slippymap::impl_layer_any!();
/// ```
#[macro_export]
macro_rules! impl_layer_any {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
