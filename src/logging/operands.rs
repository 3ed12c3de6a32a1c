use std::{
    borrow::Cow,
    fmt::{self, Write},
};

/// A value that can be passed to the print-style severity methods.
///
/// Text operands are glued to their neighbours as-is; a separating space is only
/// inserted between two adjacent non-text operands.
pub trait Operand: fmt::Display {
    fn is_text(&self) -> bool {
        false
    }
}

impl Operand for str {
    fn is_text(&self) -> bool {
        true
    }
}

impl Operand for String {
    fn is_text(&self) -> bool {
        true
    }
}

impl Operand for Cow<'_, str> {
    fn is_text(&self) -> bool {
        true
    }
}

impl<T: Operand + ?Sized> Operand for &T {
    fn is_text(&self) -> bool {
        (**self).is_text()
    }
}

macro_rules! non_text_operand {
    ($($t:ty),*) => {
        $(impl Operand for $t {})*
    };
}

non_text_operand!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

impl Operand for fmt::Arguments<'_> {}

/// Wraps any `Display` type so it can be used as a non-text operand.
pub struct Value<T>(pub T);

impl<T: fmt::Display> fmt::Display for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: fmt::Display> Operand for Value<T> {}

/// Print-style: concatenates operands, spacing only between adjacent non-text ones.
pub fn concat(args: &[&dyn Operand]) -> String {
    let mut out = String::new();
    let mut prev_text = true;

    for (i, arg) in args.iter().enumerate() {
        let is_text = arg.is_text();
        if i > 0 && !is_text && !prev_text {
            out.push(' ');
        }
        let _ = write!(out, "{}", arg);
        prev_text = is_text;
    }

    out
}

/// Println-style: a space between every pair of operands and a trailing newline.
pub fn concat_line(args: &[&dyn Operand]) -> String {
    let mut out = String::new();

    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", arg);
    }

    out.push('\n');
    out
}

/// Printf-style: standard `format_args!` substitution.
pub fn formatted(args: fmt::Arguments) -> String {
    fmt::format(args)
}
