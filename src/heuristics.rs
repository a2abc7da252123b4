use once_cell::sync::Lazy;
use regex::Regex;

use crate::window::DEFAULT_WINDOW;

/// First words that mark an `exec` argument as the start of a command rather
/// than a window name
static RE_COMMAND_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(npm|node|python|docker|cd|\./)|\s").unwrap());

/// Whether an argument reads like a command line instead of a window name.
///
/// This is a guess: a window called `node-server` is taken for a command.
/// Pass the window with `-w` to avoid it.
pub fn looks_like_command(arg: &str) -> bool {
    RE_COMMAND_START.is_match(arg)
}

/// Split `exec` arguments into window name and command.
///
/// A single argument, or a first argument that looks like a command, means
/// the whole thing is the command for the default window.
pub fn split_exec_args(args: &[String]) -> (String, String) {
    match args {
        [] => (DEFAULT_WINDOW.to_string(), String::new()),
        [first, rest @ ..] if rest.is_empty() || looks_like_command(first) => {
            (DEFAULT_WINDOW.to_string(), args.join(" "))
        }
        [first, rest @ ..] => (first.clone(), rest.join(" ")),
    }
}
