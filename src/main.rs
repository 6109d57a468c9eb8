use clap::Parser;
use miette::Result;
use yamlform::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    yamlform::core::init_logging(global.verbose, global.quiet);

    match cli.command {
        Commands::Fill(args) => yamlform::cli::commands::fill::run(args, &global),
        Commands::Check(args) => yamlform::cli::commands::check::run(args, &global),
        Commands::Render(args) => yamlform::cli::commands::render::run(args),
        Commands::Inspect(args) => yamlform::cli::commands::inspect::run(args, &global),
        Commands::Completions(args) => yamlform::cli::commands::completions::run(args),
    }
}
