/// Static metric names for one instrumented request function, generated by
/// the `#[request]` macro from the function identifier.
#[derive(Copy, Clone)]
pub struct RequestLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}
