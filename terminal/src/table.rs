use cmdkit_core::Args;
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::themes::Colorization;
use tabled::settings::{Color, Style};

/// Renders parsed arguments as rounded tables: options first, then the
/// anonymous arguments when there are any.
pub fn render_args_table(args: &Args<'_>) -> String {
    let mut builder = Builder::new();
    builder.push_record(["OPTION".to_string(), "VALUE".to_string()]);
    for (name, value) in args.iter() {
        builder.push_record([name.to_string(), value.to_string()]);
    }
    let mut out = styled(builder);

    if !args.anonymous().is_empty() {
        let mut builder = Builder::new();
        builder.push_record(["#".to_string(), "ARGUMENT".to_string()]);
        for (i, arg) in args.anonymous().iter().enumerate() {
            builder.push_record([i.to_string(), arg.clone()]);
        }
        out.push('\n');
        out.push_str(&styled(builder));
    }
    out
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Colorization::exact([Color::FG_CYAN], Rows::first()));
    table.to_string()
}
