mod cli;
mod handlers;

use std::{
    fs,
    io::{self, Read},
    path::Path,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use code_debugger::{config::Config, ExecutionRequest};
use is_terminal::IsTerminal;

use handlers::project::ProjectHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load config
    let cfg = Config::load();
    init_logging(&cfg);

    // Project management shortcuts
    let projects = ProjectHandler::from_config(&cfg);
    if args.list_projects {
        return projects.list();
    }
    if let Some(id) = &args.show_project {
        return projects.show(id);
    }
    if let Some(id) = &args.delete_project {
        return projects.delete(id);
    }
    if let Some(id) = &args.watch_project {
        let interval = cfg
            .get_millis("WATCH_INTERVAL_MS")
            .unwrap_or(Duration::from_millis(500));
        return projects.watch(id, interval).await;
    }
    if let Some(name) = &args.create_project {
        let language = args
            .resolved_language()
            .ok_or_else(|| anyhow!("--create-project needs --lang or a FILE with a known extension"))?;
        let code = match &args.file {
            Some(path) => Some(read_source(path)?),
            None => None,
        };
        return projects.create(name, language, code.as_deref());
    }

    let Some(file) = args.file.as_deref() else {
        bail!("Provide a source FILE (see --help)");
    };
    let code = read_source(file)?;

    if let Some(id) = &args.save_project {
        return projects.save(id, &code);
    }

    let language = args.resolved_language().ok_or_else(|| {
        anyhow!("Cannot infer language of {}; pass --lang python|cpp", file.display())
    })?;

    // Program input: explicit flags first, then piped stdin
    let input = if let Some(text) = &args.input {
        Some(text.clone())
    } else if let Some(path) = &args.input_file {
        Some(fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?)
    } else if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Some(buf)
    } else {
        None
    };

    let markdown = if args.no_md {
        false
    } else if args.md {
        true
    } else {
        cfg.get_bool("PRETTIFY_MARKDOWN")
    };
    let caching = !args.no_cache;

    if args.explain || args.fix || args.review || args.complete.is_some() {
        let oracle = handlers::oracle(&cfg, args.model.as_deref(), caching)?;
        let oracle = oracle.as_ref();
        if args.explain {
            return handlers::explain::run(oracle, &code, language, input.as_deref(), markdown).await;
        }
        if args.review {
            return handlers::review::run(oracle, &code, language, markdown).await;
        }
        if let Some(pos) = args.complete {
            return handlers::complete::run(oracle, &code, language, pos).await;
        }
        let mut request = ExecutionRequest::new(language, code);
        request.stdin = input;
        return handlers::fix::run(&cfg, oracle, &request, markdown).await;
    }

    let mut request = ExecutionRequest::new(language, code);
    request.stdin = input;
    handlers::run::run(&cfg, &request, args.json).await?;
    Ok(())
}

fn init_logging(cfg: &Config) {
    let level = cfg.get("LOG_LEVEL").unwrap_or_else(|| "warn".into());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading source file {}", path.display()))
}

