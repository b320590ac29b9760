pub const MAX_BUILTIN_NUMBER: usize = 0x10;

/// The ids of the host-implemented (built-in) functions the `call_c_func`
/// instruction can reach. All built-ins share one signature: they receive
/// the argument window and return a single value.
///
/// `print` is currently the entire standard library.
#[repr(u32)]
#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum BuiltinNum {
    print = 0x0,
}
