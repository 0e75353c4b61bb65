mod bind_group;
mod bindable;
mod mapped_uniform_buffer;
mod storage_buffer;
mod texture;

pub use self::bind_group::*;
pub use self::bindable::*;
pub use self::mapped_uniform_buffer::*;
pub use self::storage_buffer::*;
pub use self::texture::*;
