/// Coarse category of a failed probe, used as a log field.
pub fn describe_failure(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            if reqwest_err.is_timeout() {
                return "timeout";
            }
            if reqwest_err.is_connect() {
                return "connect";
            }
            if reqwest_err.is_request() {
                return "request";
            }
        }
    }
    "other"
}
