//! Running a parse result.
//!
//! The context chain is walked in waves, one per redirect depth. A context
//! that redirects expands into its child, once per source its modifier
//! returns; any other context runs its command.

use tracing::{debug, trace};

use crate::context::ContextBuilder;
use crate::dispatcher::Dispatcher;
use crate::error::CommandError;
use crate::handler::Source;
use crate::result::ParseResult;

impl<S: Source> Dispatcher<S> {
    /// Execute `result`, returning how many commands ran.
    ///
    /// Fails up front if the result is incomplete, and with a not-found
    /// error if some context has nothing to run or nothing ran at all.
    pub fn execute(&self, result: &ParseResult<S>) -> Result<usize, CommandError> {
        result.check()?;

        let mut top = result.context().clone();
        top.set_input(result.reader().clone());
        let mut wave = vec![top];
        let mut executed = 0;
        let mut depth = 0usize;

        while !wave.is_empty() {
            trace!(depth, contexts = wave.len(), "execution wave");
            let mut next: Vec<ContextBuilder<S>> = Vec::new();
            for context in &wave {
                match context.child() {
                    Some(child) if context.executes_child() => {
                        if !child.has_nodes() {
                            continue;
                        }
                        let sources = match context.redirect_modifier() {
                            None => vec![context.source().clone()],
                            Some(modifier) => match modifier(context) {
                                Ok(sources) => sources,
                                Err(err) if context.is_forked() => {
                                    debug!(error = %err, "forked redirect dropped");
                                    continue;
                                }
                                Err(err) => return Err(err),
                            },
                        };
                        for source in sources {
                            let mut redirected = child.copy_for(source);
                            redirected.set_input(result.reader().clone());
                            next.push(redirected);
                        }
                    }
                    _ => match context.command() {
                        Some(command) => {
                            command(context)?;
                            executed += 1;
                        }
                        None => return Err(CommandError::not_found(result.reader())),
                    },
                }
            }
            wave = next;
            depth += 1;
        }

        if executed == 0 {
            return Err(CommandError::not_found(result.reader()));
        }
        Ok(executed)
    }
}
