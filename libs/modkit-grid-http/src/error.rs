use modkit_grid::{Error, Problem};

/// Turn a grid error into the problem body for `instance` (the request path).
///
/// Database failures are logged here since their detail never reaches the
/// client. Without an explicit `trace_id` the current span id is used.
pub fn grid_error_to_problem(err: &Error, instance: &str, trace_id: Option<String>) -> Problem {
    if let Error::Db(msg) = err {
        tracing::error!(error = %msg, instance, "grid query failed in the database");
    }

    let trace_id = trace_id.or_else(|| {
        tracing::Span::current()
            .id()
            .map(|id| id.into_u64().to_string())
    });

    let problem = Problem::from(err.clone()).with_instance(instance);
    match trace_id {
        Some(id) => problem.with_trace_id(id),
        None => problem,
    }
}
