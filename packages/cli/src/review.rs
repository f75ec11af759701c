//! Interactive review of the parsed record before submission.

use console::style;

use crate::error::Result;
use crate::parser::{normalize_date, ReceiptRecord};
use crate::prompt::Prompter;

/// Field menu, in the order fields are presented and numbered.
const FIELDS: [&str; 5] = [
    "business_nif",
    "personal_nif",
    "invoice_number",
    "total_amount",
    "date",
];

/// Let the operator inspect and correct any field of the record.
///
/// The menu loops until `0` (accept all) is chosen; edited values are
/// re-validated (the amount must stay numeric, the date is re-normalized)
/// before they land in the record. Cancellation aborts the command.
pub fn review_record(record: &mut ReceiptRecord, prompter: &mut dyn Prompter) -> Result<()> {
    loop {
        println!();
        println!("{}", style("Extracted receipt data:").bold());
        print_field(1, FIELDS[0], &record.business_nif);
        print_field(2, FIELDS[1], record.personal_nif.as_deref().unwrap_or("-"));
        print_field(3, FIELDS[2], &record.invoice_number);
        print_field(4, FIELDS[3], &record.total_amount.to_string());
        print_field(5, FIELDS[4], &record.date);
        println!("0. {}", style("All good").green());

        let selection = prompter.select_number("Field to correct (0 to accept)", 0)?;
        match selection {
            0 => return Ok(()),
            1 => record.business_nif = prompter.input(FIELDS[0], Some(&record.business_nif))?,
            2 => {
                let value = prompter.input(FIELDS[1], record.personal_nif.as_deref())?;
                record.personal_nif = if value.is_empty() { None } else { Some(value) };
            }
            3 => record.invoice_number = prompter.input(FIELDS[2], Some(&record.invoice_number))?,
            4 => record.total_amount = prompt_amount(record.total_amount, prompter)?,
            5 => record.date = prompt_date(&record.date, prompter)?,
            _ => println!("Please enter a number between 0 and {}", FIELDS.len()),
        }
    }
}

fn print_field(index: usize, name: &str, value: &str) {
    println!("{index}. {name}: {}", style(value).cyan());
}

/// The replacement amount must still parse as a number.
fn prompt_amount(current: f64, prompter: &mut dyn Prompter) -> Result<f64> {
    loop {
        let value = prompter.input(FIELDS[3], Some(&current.to_string()))?;
        match value.trim().parse() {
            Ok(amount) => return Ok(amount),
            Err(_) => println!("'{value}' is not a number"),
        }
    }
}

/// The replacement date goes through the same normalization as parsing.
fn prompt_date(current: &str, prompter: &mut dyn Prompter) -> Result<String> {
    loop {
        let value = prompter.input(FIELDS[4], Some(current))?;
        match normalize_date(&value) {
            Ok(date) => return Ok(date),
            Err(e) => println!("{e}"),
        }
    }
}
