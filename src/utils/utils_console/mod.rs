#[cfg(not(target_arch = "wasm32"))]
use colored::Colorize;

/// Prints the given string with the given color.
///
/// ## Example
/// ```
/// use trajviz::utils::utils_console::{trajviz_print, PrintMode, PrintColor};
/// trajviz_print("test", PrintMode::Print, PrintColor::Blue, false);
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn trajviz_print(s: &str, mode: PrintMode, color: PrintColor, bolded: bool) {
    let mut string = if &color != &PrintColor::None {
        let c = color.get_color_triple();
        s.truecolor(c.0, c.1, c.2)
    } else {
        s.normal()
    };
    if bolded { string = string.bold(); }
    match mode {
        PrintMode::Println => { println!("{}", string); }
        PrintMode::Print => { print!("{}", string); }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn trajviz_print_new_line() {
    trajviz_print("\n", PrintMode::Print, PrintColor::None, false);
}

#[cfg(target_arch = "wasm32")]
#[allow(unused)]
pub fn trajviz_print(s: &str, mode: PrintMode, color: PrintColor, bolded: bool) {
    match mode {
        PrintMode::Println => { println!("{}", s); }
        PrintMode::Print => { print!("{}", s); }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn trajviz_print_new_line() {
    trajviz_print("\n", PrintMode::Print, PrintColor::None, false);
}

/// Prints a one-line warning in yellow.
pub fn trajviz_print_warning(s: &str) {
    trajviz_print(s, PrintMode::Println, PrintColor::Yellow, true);
}

/// Prints a one-line error in red.
pub fn trajviz_print_error(s: &str) {
    trajviz_print(s, PrintMode::Println, PrintColor::Red, true);
}

/// Enum that is used in the trajviz_print function.
/// Println will cause a new line after each line, while Print will not.
#[derive(Clone, Debug)]
pub enum PrintMode {
    Println,
    Print
}

/// Defines color for a trajviz print command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintColor {
    None,
    Blue,
    Green,
    Red,
    Yellow,
    Cyan,
    Magenta
}
impl PrintColor {
    pub fn get_color_triple(&self) -> (u8, u8, u8) {
        match self {
            PrintColor::None => { (0,0,0) }
            PrintColor::Blue => { return (0, 0, 255) }
            PrintColor::Green => { return (0, 255, 0) }
            PrintColor::Red => { return (255, 0, 0) }
            PrintColor::Yellow => { return (255, 255, 0) }
            PrintColor::Cyan => { return (0, 255, 255) }
            PrintColor::Magenta => { return (255, 0, 255) }
        }
    }
}
