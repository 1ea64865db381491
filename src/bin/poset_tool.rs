use std::io::{stdout, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use posets::{example, examples, DotWriter, Poset, Result, ShowMethod};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(clap::Args, Debug)]
struct Input {
  /// Name of a built in example
  #[arg(long, conflicts_with = "file")]
  example: Option<String>,

  /// Poset literal to read, bincode if it ends in `.bin` and JSON
  /// otherwise. JSON is read from stdin when neither option is given
  #[arg(long)]
  file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the order, its covers and its lattice properties
  Describe {
    #[command(flatten)]
    input: Input,
  },
  /// Count monotone and join preserving maps
  Count {
    #[command(flatten)]
    input: Input,

    /// Also run the exhaustive counts
    #[arg(long, action)]
    bruteforce: bool,
  },
  /// Print the canonical form as a JSON literal
  Canonical {
    #[command(flatten)]
    input: Input,
  },
  /// Write the literal with its join table in bincode form
  Convert {
    #[command(flatten)]
    input: Input,

    /// the path to save the result file
    #[arg(long)]
    output: PathBuf,
  },
  /// Write the Hasse diagram as Graphviz source
  Dot {
    #[command(flatten)]
    input: Input,

    /// Map to draw over the diagram, as comma separated images
    #[arg(long, value_delimiter = ',')]
    map: Option<Vec<usize>>,

    #[arg(long, value_enum, default_value_t = ShowMethod::Auto)]
    method: ShowMethod,

    /// Write here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
  },
  /// Compare the fast enumerations with the exhaustive ones
  Check {
    #[command(flatten)]
    input: Input,
  },
  /// Enumerate the lattices up to a size, one per isomorphism class
  Census {
    #[arg(long)]
    max_size: usize,

    /// Print every lattice, not only the counts
    #[arg(long, action)]
    list: bool,
  },
  /// List the built in examples
  Examples,
}

fn load(input: &Input) -> Result<Poset> {
  if let Some(name) = &input.example {
    return example(name);
  }
  match &input.file {
    Some(path) if path.extension().is_some_and(|ext| ext == "bin") => Poset::from_bincode(&std::fs::read(path)?),
    Some(path) => Poset::from_json(&std::fs::read_to_string(path)?),
    None => {
      let mut text = String::new();
      std::io::stdin().read_to_string(&mut text)?;
      Poset::from_json(&text)
    }
  }
}

fn run(command: Command) -> Result<ExitCode> {
  match command {
    Command::Describe { input } => {
      let poset = load(&input)?;
      print!("{}", poset.describe());
    }
    Command::Count { input, bruteforce } => {
      let poset = load(&input)?;
      tracing::info!(n = poset.n(), "counting maps");
      println!("monotone: {}", poset.iter_f_monotone().count());
      if poset.is_lattice().holds() {
        println!("lub: {}", poset.num_f_lub()?);
        println!("lub pairs: {}", poset.num_f_lub_pairs()?);
      }
      if bruteforce {
        println!("monotone (bruteforce): {}", poset.count_f_monotone_bruteforce()?);
        if poset.is_lattice().holds() {
          println!("lub (bruteforce): {}", poset.count_f_lub_bruteforce()?);
          println!("lub pairs (bruteforce): {}", poset.count_f_lub_pairs_bruteforce()?);
        }
      }
    }
    Command::Canonical { input } => {
      let poset = load(&input)?;
      println!("{}", poset.canonical().to_json(None)?);
    }
    Command::Convert { input, output } => {
      let poset = load(&input)?;
      // warm the join table so that it is stored too
      let _ = poset.lub();
      std::fs::write(&output, poset.to_bincode()?)?;
      tracing::info!(path = %output.display(), "saved");
    }
    Command::Dot { input, map, method, output } => {
      let poset = load(&input)?;
      match output {
        Some(path) => poset.show(map.as_deref(), method, &mut DotWriter::new(std::fs::File::create(path)?))?,
        None => poset.show(map.as_deref(), method, &mut DotWriter::new(stdout().lock()))?,
      }
    }
    Command::Check { input } => {
      let poset = load(&input)?;
      let comparisons = poset.crosscheck()?;
      for comparison in comparisons.iter() {
        println!("{}", comparison);
      }
      if !comparisons.iter().all(|c| c.same()) {
        return Ok(ExitCode::FAILURE);
      }
    }
    Command::Census { max_size, list } => {
      let mut per_size = vec![0usize; max_size + 1];
      for lattice in Poset::iter_all_lattices(max_size) {
        let lattice = lattice?;
        per_size[lattice.n()] += 1;
        if list {
          println!("{}", lattice);
        }
        tracing::debug!(found = per_size.iter().sum::<usize>(), "census progress");
      }
      for (size, count) in per_size.iter().enumerate() {
        println!("{}: {}", size, count);
      }
    }
    Command::Examples => {
      for (name, poset) in examples()? {
        println!("{}: {}", name, poset);
      }
    }
  }
  Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
  let args = Args::parse();
  match run(args.command) {
    Ok(code) => code,
    Err(err) => {
      tracing::error!("{}", err.explain());
      ExitCode::FAILURE
    }
  }
}
