//! An embeddable interpreter for a small declarative command language.
//!
//! Scripts are flat sequences of value constructs: literals, brace
//! lists, bare words, command calls, and `Name := value` property
//! assignments, dispatched against a host object's declared surface.
//! Evaluation is a single pass over the source with one token of
//! lookahead and no tree in between, so host effects land in script
//! order even when a later stretch of input turns out to be malformed.
//!
//! A type implements [`Host`] to expose commands and properties; the
//! declarations are validated once per type and the resulting registry
//! is cached process wide.
//!
//! ```
//! # fn main() -> Result<(), edict::Error> {
//! use edict::{evaluate, Declarations, Host, Param, TupleField, TypeDesc, Value};
//!
//! #[derive(Default)]
//! struct Canvas {
//!     title: String,
//!     cells: i64,
//! }
//!
//! impl Host for Canvas {
//!     fn declare(decl: &mut Declarations<Self>) {
//!         let pair = TypeDesc::tuple(vec![
//!             TupleField::new(TypeDesc::Int),
//!             TupleField::new(TypeDesc::Int),
//!         ]);
//!         decl.command("Area", &[Param::new("size", pair)], |_, args| {
//!             let size = args[0].as_list().unwrap();
//!             Ok(Value::Int(size[0].as_int().unwrap() * size[1].as_int().unwrap()))
//!         });
//!         decl.property("Title", TypeDesc::Str, |host, value| {
//!             host.title = value.as_str().unwrap().to_string();
//!             Ok(())
//!         });
//!         decl.property("Cells", TypeDesc::Int, |host, value| {
//!             host.cells = value.as_int().unwrap();
//!             Ok(())
//!         });
//!     }
//! }
//!
//! let mut canvas = Canvas::default();
//! evaluate(&mut canvas, r#"
//!     Title := "main"
//!     Cells := Area(size = {8, 8})
//! "#)?;
//!
//! assert_eq!(canvas.title, "main");
//! assert_eq!(canvas.cells, 64);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod registry;
pub mod runtime;
pub mod syntax;
pub mod types;

pub use error::Error;
pub use registry::{preregister, Command, Declarations, Host, Param, Property, Registry};
pub use runtime::evaluator::Evaluator;
pub use runtime::value::Value;
pub use syntax::lexer::Lexer;
pub use syntax::token::{SourceLocation, Token, TokenKind};
pub use types::descriptor::{EnumDesc, TupleField, TypeDesc};

/// Runs a script against `host`, with `<script>` as the source name in
/// error locations.
pub fn evaluate<H: Host>(host: &mut H, source: &str) -> Result<(), Error> {
    evaluate_named(host, source, "<script>")
}

/// Runs a script against `host`, tagging error locations with
/// `source_name`.
///
/// The host type's registry is built and validated on its first
/// evaluation. `before_eval` runs once the registry is ready;
/// `after_eval` runs only if the whole script succeeded.
pub fn evaluate_named<H: Host>(host: &mut H, source: &str, source_name: &str) -> Result<(), Error> {
    let registry = Registry::<H>::shared()?;
    host.before_eval();
    let mut evaluator = Evaluator::new(source, source_name, host, registry);
    let result = evaluator.run();
    if result.is_ok() {
        host.after_eval();
    }
    result
}
