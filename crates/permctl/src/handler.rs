use eyre::EyreHandler;
use itertools::Itertools;
use permission::error::dedup_chain;
use std::{error::Error, fmt};

/// Report handler printing deduplicated error chains.
#[derive(Default)]
pub struct Handler {
    debug_handler: Option<Box<dyn EyreHandler>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the debug handler with a custom one.
    pub fn debug_handler(mut self, debug_handler: Option<Box<dyn EyreHandler>>) -> Self {
        self.debug_handler = debug_handler;
        self
    }
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Display;
        dedup_chain(error).into_iter().format("; ").fmt(f)
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(debug_handler) = &self.debug_handler {
            return debug_handler.debug(error, f);
        }

        if f.alternate() {
            return fmt::Debug::fmt(error, f);
        }
        let errors = dedup_chain(error);
        let Some((error, sources)) = errors.split_first() else { return Ok(()) };
        write!(f, "{error}")?;

        if !sources.is_empty() {
            write!(f, "\n\nContext:")?;

            let multiple = sources.len() > 1;
            for (n, error) in sources.iter().enumerate() {
                writeln!(f)?;
                if multiple {
                    write!(f, "- Error #{n}: {error}")?;
                } else {
                    write!(f, "- {error}")?;
                }
            }
        }

        Ok(())
    }

    fn track_caller(&mut self, location: &'static std::panic::Location<'static>) {
        if let Some(debug_handler) = &mut self.debug_handler {
            debug_handler.track_caller(location);
        }
    }
}

/// Installs the [`eyre`] and [`panic`](mod@std::panic) hooks as the global ones.
///
/// A user-centric handler is installed unless `PERMCTL_DEBUG` is set, in which case the
/// `color-eyre` debug handler is used. Panics always go through `color-eyre`.
pub fn install() {
    let (panic_hook, debug_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug. Consider reporting it.")
        .into_hooks();
    panic_hook.install();
    let debug_hook = debug_hook.into_eyre_hook();
    let debug = std::env::var_os("PERMCTL_DEBUG").is_some();
    if let Err(e) = eyre::set_hook(Box::new(move |e| {
        Box::new(Handler::new().debug_handler(debug.then(|| debug_hook(e))))
    })) {
        debug!("failed to install eyre error hook: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Show<'a>(&'a (dyn Error + 'static), bool);

    impl fmt::Display for Show<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.1 { Handler::new().debug(self.0, f) } else { Handler::new().display(self.0, f) }
        }
    }

    #[test]
    fn formats_error_chains() {
        let report = eyre::eyre!("Invalid enode id").wrap_err("failed to boot network");
        let err: &(dyn Error + 'static) = report.as_ref();
        assert_eq!(Show(err, false).to_string(), "failed to boot network; Invalid enode id");
        assert_eq!(
            Show(err, true).to_string(),
            "failed to boot network\n\nContext:\n- Invalid enode id"
        );

        let report = eyre::eyre!("Invalid enode id").wrap_err("add node: Invalid enode id");
        let err: &(dyn Error + 'static) = report.as_ref();
        assert_eq!(Show(err, false).to_string(), "add node: Invalid enode id");
    }
}
