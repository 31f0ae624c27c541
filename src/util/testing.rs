use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{CommandNode, Forest};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // Keep skim's terminal handling quiet
    let noisy_modules = ["skim", "tuikit"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = match env::var("RUST_LOG") {
        Ok(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        Err(_) => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Sample forest used across tests:
///
/// ```text
/// a  Alpha        -> /Applications/Alpha.app
/// g  Tools/
/// ├─ t1 Terminal  -> /Applications/Terminal.app
/// └─ s  Sub/
///    └─ t2 Notes  -> /Applications/Notes.app
/// b  Beta         -> /usr/local/bin/beta
/// ```
pub fn sample_forest() -> Forest {
    vec![
        CommandNode::command("a", "Alpha", "/Applications/Alpha.app"),
        CommandNode::group("g", "Tools").with_children(vec![
            CommandNode::command("t1", "Terminal", "/Applications/Terminal.app"),
            CommandNode::group("s", "Sub").with_children(vec![CommandNode::command(
                "t2",
                "Notes",
                "/Applications/Notes.app",
            )]),
        ]),
        CommandNode::command("b", "Beta", "/usr/local/bin/beta"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::{count, duplicate_ids};

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_sample_forest_then_ids_are_unique() {
        let forest = sample_forest();
        assert_eq!(count(&forest), 6);
        assert!(duplicate_ids(&forest).is_empty());
    }
}
