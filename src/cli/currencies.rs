use super::ui;
use crate::core::CurrencyCode;
use comfy_table::{Cell, Color};

/// Builds the table of selectable currencies.
pub fn currencies_table(currencies: &[CurrencyCode]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Converts")]);

    for code in currencies {
        let routes = if code.is_anchor() {
            Cell::new("to and from any listed currency").fg(Color::Green)
        } else {
            Cell::new("to and from BRL only")
        };
        table.add_row(vec![Cell::new(code.as_str()), routes]);
    }

    table.to_string()
}

pub fn run(currencies: &[CurrencyCode]) {
    println!("{}", ui::style_text("Currencies", ui::StyleType::Title));
    println!("{}", currencies_table(currencies));
}
