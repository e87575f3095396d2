use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Returns the version string, with the git hash for non-release builds.
/// Format for releases: "0.3.2"
/// Format for dev builds: "0.3.2 (dev abc1234 2024-01-15 14:30)"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{} (dev {} {})", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    bin_name = "tally",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Flat-file trackers for expenses, students, tasks, quizzes and text", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the data files
    #[arg(long, global = true, env = "TALLY_DATA_DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Abort on the first malformed line instead of skipping it
    #[arg(long, global = true, help_heading = "Options")]
    pub strict: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track spending
    #[command(subcommand, alias = "e")]
    Expense(ExpenseCommands),

    /// Manage a class roster
    #[command(subcommand, alias = "s")]
    Student(StudentCommands),

    /// To-do list with categories
    #[command(subcommand, alias = "t")]
    Task(TaskCommands),

    /// Python basics quiz
    #[command(subcommand, alias = "q")]
    Quiz(QuizCommands),

    /// Word frequency and text statistics
    Text {
        /// Text to analyze
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Number of top words to show
        #[arg(long, short = 'n')]
        top: Option<usize>,

        /// Also write the report to report.txt in the data directory
        #[arg(long)]
        report: bool,
    },

    /// Bundle all data files into a tar.gz archive
    Export {
        /// Archive path (default: tally-<timestamp>.tar.gz)
        path: Option<PathBuf>,
    },

    /// Print the location of every data file
    Paths,

    /// Show or set configuration
    Config {
        /// Configuration key
        key: Option<String>,

        /// Value to set
        value: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Record an expense
    #[command(alias = "a")]
    Add {
        category: String,

        #[arg(allow_negative_numbers = true)]
        amount: String,

        #[arg(long, short = 'n', default_value = "")]
        note: String,

        #[arg(long, short = 'd', default_value = "")]
        day: String,
    },

    /// List expenses with totals
    #[command(alias = "ls")]
    List {
        /// Only this category
        #[arg(long, short = 'c')]
        category: Option<String>,

        /// Only this day
        #[arg(long, short = 'd')]
        day: Option<String>,
    },

    /// Totals only
    Summary {
        #[arg(long, short = 'c')]
        category: Option<String>,

        #[arg(long, short = 'd')]
        day: Option<String>,
    },

    /// Remove an expense by its list number
    #[command(alias = "rm")]
    Remove { position: usize },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SortKey {
    Grade,
    Name,
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    /// Add a student
    #[command(alias = "a")]
    Add {
        name: String,
        age: String,
        #[arg(allow_negative_numbers = true)]
        grade: String,
    },

    /// List students with statistics
    #[command(alias = "ls")]
    List {
        /// Display order (the file is not changed)
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
    },

    /// Statistics only
    Summary,

    /// Change a student by list number
    Edit {
        position: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        grade: Option<String>,
    },

    /// Remove a student by list number
    #[command(alias = "rm")]
    Remove { position: usize },

    /// Reorder the roster on disk
    Sort {
        #[arg(value_enum)]
        by: SortKey,
    },

    /// Remove every student
    Clear,

    /// Write a CSV report
    Export {
        /// Output path (default: students_report_<timestamp>.csv)
        path: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum StatusArg {
    #[default]
    All,
    Done,
    Todo,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    #[command(alias = "a")]
    Add {
        title: String,

        #[arg(long, short = 'c', default_value = "")]
        category: String,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        #[arg(long, short = 'c')]
        category: Option<String>,

        #[arg(long, short = 's', value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
    },

    /// Rename or recategorize a task
    Edit {
        title: String,

        #[arg(long = "title")]
        new_title: Option<String>,

        #[arg(long = "category")]
        new_category: Option<String>,
    },

    /// Mark tasks as done
    Done {
        #[arg(required = true, num_args = 1..)]
        titles: Vec<String>,
    },

    /// Mark tasks as not done
    Undo {
        #[arg(required = true, num_args = 1..)]
        titles: Vec<String>,
    },

    /// Remove a task
    #[command(alias = "rm")]
    Remove { title: String },

    /// Completion statistics
    Stats,

    /// Known categories
    Categories,

    /// Replace all tasks from a JSON array or title,category,True|False lines
    Import { file: PathBuf },

    /// Write all tasks as JSON
    Export {
        /// Output path (default: tasks-export.json)
        path: Option<PathBuf>,
    },

    /// Remove every task
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    /// Print questions with their ids
    Questions {
        #[arg(long, short = 'n', default_value_t = 10)]
        count: usize,

        #[arg(long)]
        shuffle: bool,
    },

    /// Grade answers given as ID=ANSWER pairs
    Submit {
        #[arg(required = true, num_args = 1.., value_name = "ID=ANSWER")]
        answers: Vec<String>,
    },

    /// Past attempts, newest first
    History,
}
