pub mod detail;
pub mod source;

pub use detail::DeviceDetail;
pub use source::{device_list, DeviceList, DeviceSource};
