pub(crate) mod binding;
pub(crate) mod kind;
pub(crate) mod registry;
