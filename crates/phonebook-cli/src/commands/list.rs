//! Listing command handler

use std::io::{self, BufRead, Write};

use anyhow::Result;

use phonebook_core::Table;

use crate::output::Output;

/// Show every entry, one page at a time
///
/// In human mode the user is asked before each further page. Other modes
/// print all pages without prompting.
pub fn run(table: &mut Table, page_size: usize, output: &Output) -> Result<()> {
    let stdin = io::stdin();
    show_pages(table, page_size, output, &mut stdin.lock())?;
    Ok(())
}

/// Print pages until the last one or a "no" answer; returns pages shown
fn show_pages(
    table: &mut Table,
    page_size: usize,
    output: &Output,
    input: &mut impl BufRead,
) -> Result<usize> {
    let Some(mut pages) = table.all(page_size)? else {
        output.message("Phonebook is empty");
        return Ok(0);
    };

    let mut number = 0;

    while let Some(page) = pages.next() {
        number += 1;
        output.print_page(number, &page);

        if pages.len() == 0 {
            output.message("It was the last page");
            break;
        }
        if output.should_prompt() && !ask_next_page(input)? {
            break;
        }
    }

    Ok(number)
}

/// Ask whether to show the next page; only "y" continues
fn ask_next_page(input: &mut impl BufRead) -> Result<bool> {
    print!("Next page? (y/n) ");
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
