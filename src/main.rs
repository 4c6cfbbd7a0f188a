use casegen::dialog::{self, type_color, ConfirmDialog};
use casegen::forms::{self, GenerateRequest, LoginForm, ProjectForm, SignupForm};
use casegen::view::{self, pluralize_test_cases};
use casegen::{
    export_file_name, export_project, log_in, restore_session, Backend, Config, Error, ExportFormat,
    FeatureListMsg, FeatureListState, HttpBackend, Project, ProjectDetail, ProjectListMsg,
    ProjectListState, Result, Session, SessionStore, SortKey, TypeFilter,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use serde::de::DeserializeOwned;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "casegen")]
#[command(author, version, about = "AI test case generator client - manage projects, generate and export test cases")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show debug logs on stderr (or set CASEGEN_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Replace a working session without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Forget the stored session token
    Logout,

    /// Show the logged-in account
    Whoami,

    /// List projects with search, sort and pagination
    Projects {
        /// Case-insensitive match on name or description
        #[arg(short, long, default_value = "")]
        search: String,

        /// date-desc, date-asc, name-asc or name-desc
        #[arg(long, default_value = "date-desc")]
        sort: SortKey,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Read the project list from a JSON file instead of the backend
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Create a project
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show a project's features and test cases
    Show {
        /// Project ID (optional with --from)
        project: Option<i32>,

        /// Case-insensitive match on features and test cases
        #[arg(short, long, default_value = "")]
        search: String,

        /// all, functional, negative, boundary or exploratory
        #[arg(short = 't', long = "type", default_value = "all")]
        filter: TypeFilter,

        /// Collapse a feature section (repeatable)
        #[arg(long)]
        collapse: Vec<String>,

        /// Read the project from a JSON file instead of the backend
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Rename or redescribe a project
    Edit {
        project: i32,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a project with all its features and test cases
    Delete {
        project: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate test cases for a requirement
    Generate {
        project: i32,
        #[arg(short, long)]
        feature: Option<String>,
        #[arg(short, long)]
        requirement: Option<String>,
        /// Prefill from a built-in sample (see `casegen samples`)
        #[arg(long)]
        sample: Option<usize>,
        /// Generate even if the feature already has test cases
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete a feature and all of its test cases
    DeleteFeature {
        project: i32,
        feature: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export a project's test cases as CSV or JSON
    Export {
        /// Project ID (optional with --from)
        project: Option<i32>,

        /// csv or json
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Output file or directory (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read the project from a JSON file instead of the backend
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// List the built-in sample requirements
    Samples,

    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Everything a command needs, resolved once
struct App {
    config: Config,
    store: SessionStore,
}

impl App {
    fn new() -> Self {
        Self {
            config: Config::load(),
            store: SessionStore::locate(),
        }
    }

    fn backend(&self) -> Result<HttpBackend> {
        HttpBackend::new(&self.config)
    }

    fn session(&self) -> Result<Session> {
        self.store.load()
    }

    fn project_detail(&self, project: Option<i32>, from: Option<&Path>) -> Result<ProjectDetail> {
        match (from, project) {
            (Some(path), _) => read_json(path),
            (None, Some(id)) => self.backend()?.get_project(&self.session()?, id),
            (None, None) => Err(Error::validation(
                "project",
                "give a project ID or --from <FILE>",
            )),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(dialog: &ConfirmDialog, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(dialog.ask_terminal()?)
}

/// Test cases already stored for a feature; an unknown feature has none
fn existing_test_cases(
    backend: &dyn Backend,
    session: &Session,
    project: i32,
    feature: &str,
) -> Result<usize> {
    match backend.feature_test_cases(session, project, feature) {
        Ok(cases) => Ok(cases.len()),
        Err(Error::Api { status: 404, .. }) => Ok(0),
        Err(e) => Err(e),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn print_projects(projects: &[Project], state: &ProjectListState) {
    let view = state.view(projects);
    let params = state.params();

    if view.total_filtered == 0 {
        if params.search.is_empty() {
            println!("No projects yet. Create one with 'casegen create <NAME>'.");
        } else {
            println!("No projects match \"{}\".", params.search);
        }
        return;
    }

    println!(
        "{} {}",
        "Projects".bold(),
        format!(
            "(page {}/{}, {} total, sorted {})",
            params.page, view.total_pages, view.total_filtered, params.sort
        )
        .dimmed()
    );
    for project in &view.visible {
        println!(
            "  {:>4}  {:<32}  {}  {}",
            format!("#{}", project.id).cyan(),
            truncate(&project.name, 32),
            project.created_at.format("%Y-%m-%d").to_string().dimmed(),
            truncate(project.description.as_deref().unwrap_or(""), 48)
        );
    }
}

fn print_project(detail: &ProjectDetail, state: &FeatureListState) {
    let project = &detail.project;
    let stats = view::project_stats(&detail.features);

    println!("{} {}", project.name.bold(), format!("#{}", project.id).dimmed());
    if let Some(description) = &project.description {
        println!("{}", description);
    }
    println!(
        "{} features, {}",
        stats.features,
        pluralize_test_cases(stats.test_cases)
    );

    if detail.features.is_empty() {
        println!("\nNo features yet. Generate some with 'casegen generate {}'.", project.id);
        return;
    }

    if let Some(summary) = state.summary(&detail.features) {
        println!("\n{}", summary.italic());
    }

    let feature_view = state.view(&detail.features);
    if feature_view.visible.is_empty() {
        println!("\nNo test cases match the current search and filter.");
        return;
    }

    for feature in &feature_view.visible {
        let expanded = state.is_expanded(&feature.feature_name);
        println!(
            "\n{} {} {}",
            if expanded { "▼" } else { "▶" },
            feature.feature_name.bold(),
            format!("({})", pluralize_test_cases(feature.test_cases.len())).dimmed()
        );
        if !expanded {
            continue;
        }

        println!("  {} {}", "Requirement:".bold(), feature.requirement_text);
        let distribution: Vec<String> = view::type_distribution(feature)
            .into_iter()
            .map(|(kind, count)| format!("{} {}", count, kind).color(type_color(kind)).to_string())
            .collect();
        println!("  {}", distribution.join("  "));

        for tc in &feature.test_cases {
            println!(
                "\n  {} {} {}",
                format!("[{}]", tc.id).dimmed(),
                tc.title.bold(),
                format!("[{}]", tc.kind).color(type_color(tc.kind))
            );
            println!("    {}", tc.description);
            for (i, step) in tc.steps.iter().enumerate() {
                println!("    {}. {}", i + 1, step);
            }
            println!("    {} {}", "Expected:".bold(), tc.expected_result);
        }
    }
}

fn run(command: Command) -> Result<()> {
    let app = App::new();

    match command {
        Command::Signup {
            email,
            username,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let form = SignupForm {
                email,
                username,
                password,
            };
            let user = app.backend()?.signup(&form)?;
            println!(
                "{} Account created for {} ({}). Log in with 'casegen login --email {}'.",
                "✓".green(),
                user.username,
                user.email,
                user.email
            );
        }

        Command::Login {
            email,
            password,
            yes,
        } => {
            let backend = app.backend()?;
            if let Some(current) = restore_session(&app.store, &backend)? {
                if !confirm(&dialog::replace_session_dialog(&current.username), yes)? {
                    println!("Still logged in as {}.", current.username);
                    return Ok(());
                }
            }
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let user = log_in(&app.store, &backend, &LoginForm { email, password })?;
            println!("{} Logged in as {}", "✓".green(), user.username.bold());
        }

        Command::Logout => {
            app.store.clear()?;
            println!("{} Logged out", "✓".green());
        }

        Command::Whoami => {
            let backend = app.backend()?;
            match restore_session(&app.store, &backend)? {
                Some(user) => println!("{} <{}>", user.username.bold(), user.email),
                None => {
                    println!("Not logged in.");
                    std::process::exit(1);
                }
            }
        }

        Command::Projects {
            search,
            sort,
            page,
            from,
        } => {
            let projects: Vec<Project> = match from {
                Some(path) => read_json(&path)?,
                None => app.backend()?.list_projects(&app.session()?)?,
            };
            let mut state = ProjectListState::with_page_size(app.config.view.page_size);
            state.update(ProjectListMsg::SetSearch(search), &projects);
            state.update(ProjectListMsg::SetSort(sort), &projects);
            state.update(ProjectListMsg::GoToPage(page), &projects);
            print_projects(&projects, &state);
        }

        Command::Create { name, description } => {
            let form = ProjectForm::new(&name, description.as_deref());
            let project = app.backend()?.create_project(&app.session()?, &form)?;
            println!(
                "{} Created project {} {}",
                "✓".green(),
                project.name.bold(),
                format!("#{}", project.id).dimmed()
            );
        }

        Command::Show {
            project,
            search,
            filter,
            collapse,
            from,
        } => {
            let detail = app.project_detail(project, from.as_deref())?;
            let mut state = FeatureListState::for_features(&detail.features);
            state.update(FeatureListMsg::SetSearch(search));
            state.update(FeatureListMsg::SetFilter(filter));
            for name in collapse {
                state.update(FeatureListMsg::ToggleFeature(name));
            }
            print_project(&detail, &state);
        }

        Command::Edit {
            project,
            name,
            description,
        } => {
            let backend = app.backend()?;
            let session = app.session()?;
            let form = match (name, description) {
                (Some(name), Some(description)) => ProjectForm::new(&name, Some(&description)),
                (name, description) => {
                    let current = backend.get_project(&session, project)?.project;
                    ProjectForm {
                        name: name.unwrap_or(current.name),
                        description: description.or(current.description),
                    }
                }
            };
            let updated = backend.update_project(&session, project, &form)?;
            println!("{} Updated project {}", "✓".green(), updated.name.bold());
        }

        Command::Delete { project, yes } => {
            let backend = app.backend()?;
            let session = app.session()?;
            let current = backend.get_project(&session, project)?;
            let dialog = ConfirmDialog::new(format!(
                "Delete \"{}\"? This will delete all test cases.",
                current.project.name
            ))
            .title("Delete project");
            if !confirm(&dialog, yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            backend.delete_project(&session, project)?;
            println!("{} Deleted project {}", "✓".green(), current.project.name.bold());
        }

        Command::Generate {
            project,
            feature,
            requirement,
            sample,
            yes,
        } => {
            let base = match sample {
                Some(index) => forms::sample(index)?.to_request(),
                None => GenerateRequest {
                    feature_name: String::new(),
                    requirement_text: String::new(),
                },
            };
            let request = GenerateRequest {
                feature_name: feature.unwrap_or(base.feature_name),
                requirement_text: requirement.unwrap_or(base.requirement_text),
            }
            .validate()?;
            let backend = app.backend()?;
            let session = app.session()?;
            if !yes {
                let existing =
                    existing_test_cases(&backend, &session, project, &request.feature_name)?;
                if existing > 0
                    && !confirm(
                        &dialog::existing_feature_dialog(&request.feature_name, existing),
                        false,
                    )?
                {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            eprintln!("{}", "Generating test cases...".dimmed());
            let result = backend.generate(&session, project, &request)?;
            println!(
                "{} Generated {} for \"{}\"",
                "✓".green(),
                pluralize_test_cases(result.test_cases_count),
                result.feature_name
            );
        }

        Command::DeleteFeature {
            project,
            feature,
            yes,
        } => {
            let dialog = ConfirmDialog::new(format!(
                "Delete all test cases for \"{}\"? This cannot be undone.",
                feature
            ))
            .title("Delete feature");
            if !confirm(&dialog, yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            app.backend()?
                .delete_feature(&app.session()?, project, &feature)?;
            println!("{} Deleted all test cases for \"{}\"", "✓".green(), feature);
        }

        Command::Export {
            project,
            format,
            output,
            from,
        } => {
            let detail = app.project_detail(project, from.as_deref())?;
            let content = export_project(&detail, format)?;
            match output {
                None => println!("{}", content),
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(export_file_name(&detail.project.name, format))
                    } else {
                        path
                    };
                    std::fs::write(&path, content)?;
                    eprintln!("{} Exported to {}", "✓".green(), path.display());
                }
            }
        }

        Command::Samples => {
            for (i, sample) in forms::SAMPLE_REQUIREMENTS.iter().enumerate() {
                println!("{} {}", format!("{}.", i + 1).cyan(), sample.feature.bold());
                println!("   {}", sample.text);
            }
        }

        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "casegen", &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    casegen::logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
