pub(crate) mod frame;
pub(crate) mod pool;
pub(crate) mod texture;
