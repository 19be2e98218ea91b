pub(crate) mod dummyjson_upstream;
pub(crate) mod post_upstream;
