// Presentation layer - formatting, colors and the console front end
pub mod colors;
pub mod console;
pub mod format;
pub mod view;
