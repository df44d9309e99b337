//! Property tests for literal round-tripping through the evaluator.

use proptest::prelude::*;

use edict::{evaluate, Declarations, Host, TypeDesc, Value};

/// Accepts anything and remembers the last value it was handed.
#[derive(Default)]
struct Sink {
    got: Option<Value>,
}

impl Host for Sink {
    fn declare(decl: &mut Declarations<Self>) {
        decl.property("Keep", TypeDesc::Any, |host, value| {
            host.got = Some(value);
            Ok(())
        });
    }
}

fn keep(script: &str) -> Value {
    let mut sink = Sink::default();
    evaluate(&mut sink, script).unwrap();
    sink.got.unwrap()
}

proptest! {
    #[test]
    fn integer_literals_round_trip(x in any::<i64>()) {
        prop_assert_eq!(keep(&format!("Keep := {x}")), Value::Int(x));
    }

    #[test]
    fn float_literals_round_trip(whole in 0u32..1_000_000, frac in 0u32..1_000_000, negative: bool) {
        let text = format!("{whole}.{frac}");
        let expected = text.parse::<f64>().unwrap();
        let script = if negative {
            format!("Keep := -{text}")
        } else {
            format!("Keep := {text}")
        };
        prop_assert_eq!(keep(&script), Value::Float(if negative { -expected } else { expected }));
    }

    #[test]
    fn string_literals_round_trip(s in "[^\"]*") {
        prop_assert_eq!(keep(&format!("Keep := \"{s}\"")), Value::Str(s));
    }

    #[test]
    fn bare_words_arrive_as_strings(w in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
        prop_assert_eq!(keep(&format!("Keep := {w}")), Value::Str(w));
    }

    #[test]
    fn integer_lists_round_trip(xs in prop::collection::vec(any::<i64>(), 0..20)) {
        let joined = xs.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(", ");
        let expected = Value::List(xs.iter().copied().map(Value::Int).collect());
        prop_assert_eq!(keep(&format!("Keep := {{{joined}}}")), expected);
    }

    #[test]
    fn whitespace_between_tokens_is_free(pads in prop::collection::vec("[ \t\r\n]{0,4}", 4)) {
        let script = format!("{}Keep{}:={}41{}", pads[0], pads[1], pads[2], pads[3]);
        prop_assert_eq!(keep(&script), Value::Int(41));
    }
}
