use cfg_if::cfg_if;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub mod web;
    }
}
