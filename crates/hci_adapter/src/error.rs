//! Error taxonomy for the adapter, matching `adapter_kernel::KernelError`'s
//! shape one level up the stack.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdapterError {
    InvalidArgument,
    ResourceExhausted,
    TransportError,
    ProtocolError,
    Fatal,
}

impl From<adapter_kernel::KernelError> for AdapterError {
    fn from(e: adapter_kernel::KernelError) -> Self {
        match e {
            adapter_kernel::KernelError::InvalidArgument => AdapterError::InvalidArgument,
            adapter_kernel::KernelError::ResourceExhausted => AdapterError::ResourceExhausted,
            adapter_kernel::KernelError::WouldBlock | adapter_kernel::KernelError::TimedOut => {
                AdapterError::Fatal
            }
        }
    }
}
