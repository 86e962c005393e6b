//! The documented local development workflow, as scenarios.
//!
//! Each scenario starts from an empty scratch directory. Scenarios that need an
//! isolated environment create their own.

use vaultdoc_protocol::{EnvPart, Postcondition, Program, Scenario, WorkflowStep};
use vaultdoc_runtime::DEFAULT_VENV_NAME;

/// Documented `.gitignore` contents
pub const GITIGNORE_PATTERNS: &str = "venv/\n*.pyc\n__pycache__/\n.env";

/// Documented project layout; trailing `/` marks a directory
pub const PROJECT_LAYOUT: [&str; 9] = [
    "venv/",
    "src/",
    "src/main.py",
    "src/utils.py",
    "tests/",
    "tests/test_main.py",
    "requirements.txt",
    ".gitignore",
    "README.md",
];

/// Paths the ignore patterns must hide from `git status`
const IGNORED_FIXTURES: [&str; 5] = ["venv/", "__pycache__/", "test.pyc", ".env", "__pycache__/test.pyc"];

fn create_env() -> WorkflowStep {
    WorkflowStep::command(
        "python -m venv venv",
        Program::HostPython,
        &["-m", "venv", DEFAULT_VENV_NAME],
    )
    .long_running()
    .expect(Postcondition::EnvLayoutExists {
        parts: vec![EnvPart::Root, EnvPart::Interpreter, EnvPart::Installer],
    })
}

fn install(package: &str) -> WorkflowStep {
    WorkflowStep::command(
        &format!("pip install {}", package),
        Program::EnvInstaller,
        &["install", package],
    )
    .long_running()
}

pub fn venv_creation() -> Scenario {
    Scenario::new("venv creation", vec![create_env()])
}

pub fn activation_script() -> Scenario {
    Scenario::new(
        "activation script",
        vec![
            create_env(),
            WorkflowStep::inspect(
                "activation script exists",
                Postcondition::EnvLayoutExists {
                    parts: vec![EnvPart::ActivationScript],
                },
            ),
        ],
    )
}

pub fn package_install(package: &str) -> Scenario {
    let import = format!("import {}; print(\"success\")", package);
    Scenario::new(
        "package install",
        vec![
            create_env(),
            install(package),
            WorkflowStep::command(
                &format!("import {} in venv", package),
                Program::EnvPython,
                &["-c", &import],
            )
            .expect(Postcondition::StdoutContains {
                token: "success".to_string(),
            }),
        ],
    )
}

pub fn requirements_freeze(package: &str) -> Scenario {
    Scenario::new(
        "requirements freeze",
        vec![
            create_env(),
            install(package),
            WorkflowStep::command("pip freeze > requirements.txt", Program::EnvInstaller, &["freeze"])
                .redirect_stdout("requirements.txt")
                .expect(Postcondition::FileContains {
                    path: "requirements.txt".into(),
                    token: package.to_string(),
                }),
        ],
    )
}

pub fn gitignore_patterns() -> Scenario {
    Scenario::new(
        "gitignore patterns",
        vec![
            WorkflowStep::write_file("write .gitignore", ".gitignore", GITIGNORE_PATTERNS),
            WorkflowStep::materialize("create ignored files", &IGNORED_FIXTURES),
            WorkflowStep::command("git init", Program::Git, &["init"]).optional_tool(),
            WorkflowStep::command("git add .gitignore", Program::Git, &["add", ".gitignore"])
                .optional_tool(),
            WorkflowStep::command("git status --porcelain", Program::Git, &["status", "--porcelain"])
                .optional_tool()
                .expect(Postcondition::StdoutExcludes {
                    tokens: vec!["venv/".to_string(), ".pyc".to_string(), ".env".to_string()],
                }),
        ],
    )
}

pub fn project_structure() -> Scenario {
    Scenario::new(
        "project structure",
        vec![WorkflowStep::materialize("create recommended layout", &PROJECT_LAYOUT)],
    )
}

/// Every documented scenario, in documentation order.
pub fn documented_scenarios(install_package: &str) -> Vec<Scenario> {
    vec![
        venv_creation(),
        activation_script(),
        package_install(install_package),
        requirements_freeze(install_package),
        gitignore_patterns(),
        project_structure(),
    ]
}
