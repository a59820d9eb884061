use std::sync::LazyLock;

use regex::Regex;

/// `{@link com.vmware.vcenter.VM#list}` style reference markup.
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{@[a-z]* ([.,#A-Za-z0-9_]*)\}").expect("annotation pattern is valid")
});

/// Replace every `{@tag identifier}` with `identifier`.
///
/// Substitution repeats until nothing matches, so the result is stable under reapplication.
pub fn strip_annotations(text: &str) -> String {
    let mut current = text.to_string();
    // every pass shortens the text, so this terminates
    while ANNOTATION.is_match(&current) {
        current = ANNOTATION.replace_all(&current, "$1").into_owned();
    }
    current
}
