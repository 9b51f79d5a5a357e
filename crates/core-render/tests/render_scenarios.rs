use core_render::balloon::{BorderRow, SideGlyphs};
use core_render::{AttributeMode, BalloonStyle, RenderError, RenderOptions, TruncateFrom, render};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

fn boxed() -> BalloonStyle {
    let mut style = BalloonStyle::say();
    style.north = vec![BorderRow::new("+", "-", "-", "-", "+")];
    style.south = style.north.clone();
    style.west = SideGlyphs::new("|", "|", "|", "|");
    style.east = style.west.clone();
    style
}

fn plain() -> RenderOptions {
    RenderOptions {
        attribute_mode: AttributeMode::Plain,
        ..RenderOptions::default()
    }
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (Self { inner: buf.clone() }, buf)
    }
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl<'a> Write for LockedWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

#[test]
fn variable_substitution() {
    let out = render("A$x$B", "", &plain().with_variable("x", "-")).unwrap();
    assert_eq!(out.text, "A-B");
}

#[test]
fn empty_directive_renders_dollar() {
    assert_eq!(render("$$", "", &plain()).unwrap().text, "$");
}

#[test]
fn message_wrapped_inside_balloon() {
    let opts = plain()
        .with_style(boxed())
        .with_wrap_column(11)
        .with_wrap_limits(8, 1);
    let out = render("$balloon$", "aaaa bbbb cccc", &opts).unwrap();
    assert_eq!(
        out.text,
        "+---------+\n|aaaa bbbb|\n|cccc     |\n+---------+"
    );
    assert_eq!(out.diagnostics, None);
}

#[test]
fn minimal_box_around_short_message() {
    let out = render("$balloon$", "hi", &plain().with_style(boxed())).unwrap();
    assert_eq!(out.text, "+--+\n|hi|\n+--+");
}

#[test]
fn unterminated_directive_is_fatal() {
    assert_eq!(
        render("A$x", "", &plain()),
        Err(RenderError::UnterminatedDirective { line: 1, column: 2 })
    );
}

#[test]
fn undefined_variable_is_fatal() {
    let err = render("ok\n $who$", "", &plain()).unwrap_err();
    assert_eq!(
        err,
        RenderError::UndefinedVariable {
            name: "who".into(),
            line: 2,
            column: 2
        }
    );
}

#[test]
fn say_balloon_over_cow() {
    let template = concat!(
        "$balloon5$\n",
        "        $\\$   ^__^\n",
        "         $\\$  (oo)\\_______\n",
        "            (__)\\       )\\/\\\n",
    );
    let opts = plain().with_style(BalloonStyle::say());
    let out = render(template, "moo", &opts).unwrap();
    assert_eq!(
        out.text,
        concat!(
            " _____ \n",
            "< moo > \\   ^__^\n",
            " -----   \\  (oo)\\_______\n",
            "            (__)\\       )\\/\\\n",
        )
    );
}

#[test]
fn link_glyphs_colored_in_own_scope() {
    let opts = RenderOptions {
        link_color: "\u{1b}[33m".into(),
        ..RenderOptions::default()
    }
    .with_style(BalloonStyle::say());
    let out = render("\u{1b}[1m$\\$x", "", &opts).unwrap();
    assert_eq!(
        out.text,
        "\u{1b}[1m\u{1b}[0m\u{1b}[33m\\\u{1b}[0;1mx"
    );
}

#[test]
fn plain_mode_strips_template_escapes() {
    let out = render("\u{1b}[31mred\u{1b}[0m", "", &plain()).unwrap();
    assert_eq!(out.text, "red");
}

#[test]
fn viewport_truncates_from_top() {
    let opts = RenderOptions {
        truncate_from: TruncateFrom::Top,
        ..plain()
    }
    .with_viewport(Some(3), Some(2));
    let out = render("abcdef\nghijkl\nmnopqr\n", "", &opts).unwrap();
    assert_eq!(out.text, "ghi\nmno\n");
}

#[test]
fn wrap_degradation_reported_and_logged() {
    let opts = plain().with_style(boxed()).with_wrap_column(10);
    let (writer, buffer) = BufferWriter::new();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(writer)
        .finish();

    // the indentation alone exhausts the 8 columns left for the message
    let message = "          x";
    let out = with_default(subscriber, || render("$balloon$", message, &opts)).unwrap();

    let diagnostics = out.diagnostics.expect("wrap fault reported");
    assert!(diagnostics.contains("wrap fault"));
    assert!(out.text.contains("|          x|"));

    let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(log_output.contains("WARN wrap:"));
    assert!(log_output.contains("wrap_degraded"));
    assert!(log_output.contains("message_wrap_degraded"));
    // sizes only, never message content
    assert!(!log_output.contains("          x"));
}
