//! Common source code fixtures for tests.

use once_cell::sync::Lazy;
use thorn_syntax::{Tree, parse};

pub const LET_DECLARATION: &str = "let x = 1";

pub const STATEMENTS: &str = r#"let a = 1;
let b = a + 2;
@immut c: number = b * 3;
print(c);
"#;

pub const FUNCTIONS: &str = r#"
$ add(a: number, b: number): number {
    return a + b
}

$ greet(name) {
    print("hello ${name}!\n");
}

f = $(x) => x * 2;
"#;

pub const CONTROL_FLOW: &str = r#"
for (let i = 0; i < 10; i += 1) {
    if (i % 2 == 0) continue_with(i); else skip();
}
while (running && !done) { step() }
for (item in items) total += item.price;
try { risky() } catch (e) { log(e) }
"#;

pub const CLASSES: &str = r#"
import { Base, helper } from "lib";
export class Counter {
    $ increment() { this.count += 1; }
    $ value(): number { return this.count }
}
"#;

pub const DATA: &str = r#"
let config = {"name": "thorn", "tags": ["a", "b"], "nested": {"depth": 2}};
let label = match (config["depth"]) {
    0 => "flat",
    n if n > 1 => "deep",
    _ => "unknown",
};
"#;

/// Fragments random documents are assembled from
pub const FRAGMENTS: &[&str] = &[
    "let ", "x", "y1", " = ", "1", "2.5", ";", "\n", " ", "(", ")", "{", "}", "[", "]", "+", "*", "-",
    "==", ",", ":", "\"", "str ", "${", "$", "=>", "if ", "else ", "return ", "f(", "// c\n", "/* b */",
    "@immut ", "match ", "_", "#", ".", "é",
];

/// ASCII fragments, safe to splice at any byte offset
pub const EDIT_FRAGMENTS: &[&str] = &[
    "", "1", "x", " ", ";", "\n", "(", ")", "{", "}", "\"", "${", "+ 2", "let z = 3;", "// note\n", "/*",
    "*/", "]",
];

/// `FUNCTIONS`, parsed once and shared across tests
pub static FUNCTIONS_TREE: Lazy<Tree> = Lazy::new(|| parse(FUNCTIONS));
