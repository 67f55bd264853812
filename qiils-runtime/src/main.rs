use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, ArgMatches, Command};
use qiils_graph::{
    generation::RandomRegular,
    loading::{instance_file_name, instance_name, load_graph, save_graph, GraphFormat},
    objective::ising_energy,
    solution::evaluate_solution,
    Solution, WeightedGraph,
};
use qiils_solvers::{Progress, SpinRunOutput};
use qiils_utils::{dejsonify, jsonify, save_record, KnownOptima, RunRecord};
use serde_json::{Map, Value};
use std::{fs, io::Read, path::PathBuf};

fn cli() -> Command {
    Command::new("qiils")
        .about("Approximates MaxCut on weighted graphs")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("solve")
                .about("Runs a solver on a graph file")
                .arg(
                    arg!(<SOLVER> "Solver to run: sa, tabu or qiils")
                        .value_parser(["sa", "tabu", "qiils"]),
                )
                .arg(
                    arg!(<GRAPH> "Path to a graph file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--format [FORMAT] "Graph file format: gset or custom")
                        .default_value("gset")
                        .value_parser(clap::value_parser!(GraphFormat)),
                )
                .arg(
                    arg!(--unweighted "Ignore weights in the graph file")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--params [PARAMS] "Solver hyperparameters as a json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--seed [SEED] "Overrides the seed hyperparameter")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--instance [INSTANCE] "Instance name used for the optimum lookup (default: graph file stem)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--optima [OPTIMA] "Json file of known optima or a solution record")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the run record will be saved to this file path (default json)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--compress "If output file is set, the run record will be compressed as zlib")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Evaluates a spin assignment on a graph file")
                .arg(
                    arg!(<GRAPH> "Path to a graph file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--format [FORMAT] "Graph file format: gset or custom")
                        .default_value("gset")
                        .value_parser(clap::value_parser!(GraphFormat)),
                )
                .arg(
                    arg!(--unweighted "Ignore weights in the graph file")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Generates a random regular graph in the custom format")
                .arg(arg!(<N> "Number of vertices").value_parser(clap::value_parser!(usize)))
                .arg(arg!(<K> "Degree of every vertex").value_parser(clap::value_parser!(usize)))
                .arg(arg!(<SEED> "Generator seed").value_parser(clap::value_parser!(u64)))
                .arg(
                    arg!(--unweighted "Give every edge weight 1")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "Output path (default: the generated instance file name)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn main() {
    env_logger::init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("solve", sub_m)) => run_solve(sub_m),
        Some(("evaluate", sub_m)) => run_evaluate(sub_m),
        Some(("generate", sub_m)) => run_generate(sub_m),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, name: &str) -> Result<T> {
    matches
        .get_one::<T>(name)
        .cloned()
        .ok_or_else(|| anyhow!("Missing argument '{}'", name))
}

fn run_solve(m: &ArgMatches) -> Result<()> {
    solve(&SolveOptions::from_matches(m)?)
}

fn run_evaluate(m: &ArgMatches) -> Result<()> {
    evaluate(
        required::<PathBuf>(m, "GRAPH")?,
        required::<String>(m, "SOLUTION")?,
        required::<GraphFormat>(m, "format")?,
        m.get_flag("unweighted"),
    )
}

fn run_generate(m: &ArgMatches) -> Result<()> {
    generate(
        required::<usize>(m, "N")?,
        required::<usize>(m, "K")?,
        required::<u64>(m, "SEED")?,
        m.get_flag("unweighted"),
        m.get_one::<PathBuf>("output").cloned(),
    )
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub solver: String,
    pub graph_path: PathBuf,
    pub format: GraphFormat,
    pub unweighted: bool,
    pub params: Option<String>,
    pub seed: Option<u64>,
    pub instance: Option<String>,
    pub optima_path: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub compress: bool,
}

impl SolveOptions {
    fn from_matches(m: &ArgMatches) -> Result<Self> {
        Ok(Self {
            solver: required::<String>(m, "SOLVER")?,
            graph_path: required::<PathBuf>(m, "GRAPH")?,
            format: required::<GraphFormat>(m, "format")?,
            unweighted: m.get_flag("unweighted"),
            params: m.get_one::<String>("params").cloned(),
            seed: m.get_one::<u64>("seed").copied(),
            instance: m.get_one::<String>("instance").cloned(),
            optima_path: m.get_one::<PathBuf>("optima").cloned(),
            output_file: m.get_one::<PathBuf>("output").cloned(),
            compress: m.get_flag("compress"),
        })
    }

    /// Instance name for the optimum lookup; the graph file stem unless given.
    fn instance_name(&self) -> String {
        self.instance.clone().unwrap_or_else(|| {
            self.graph_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }
}

pub fn solve(options: &SolveOptions) -> Result<()> {
    let graph = load_graph(&options.graph_path, options.format, !options.unweighted)?;
    let mut hyperparameters = load_hyperparameters(options.params.as_deref())?;
    if let Some(seed) = options.seed {
        hyperparameters
            .get_or_insert_with(Map::new)
            .insert("seed".to_string(), Value::from(seed));
    }
    let instance = options.instance_name();
    let mut optima = KnownOptima::gset();
    if let Some(path) = &options.optima_path {
        optima.extend_from_file(path)?;
    }

    log::info!(
        "solving '{}' ({} vertices, {} edges) with {}",
        instance,
        graph.num_vertices(),
        graph.num_edges(),
        options.solver
    );
    let record = run_solver(&options.solver, &graph, &hyperparameters, instance)?;
    let record = {
        let optimum = optima.lookup(&record.instance);
        record.with_optimum(optimum)
    };

    if let Some(path) = &options.output_file {
        save_record(path, &record, options.compress)?;
        println!("run record written to: {:?}", path);
    } else {
        println!("{}", jsonify(&record)?);
    }
    Ok(())
}

fn report_progress(p: &Progress) {
    log::trace!(
        "{}/{}: cut {}, best {}",
        p.iteration,
        p.total,
        p.current_cut,
        p.best_cut
    );
}

fn spin_record(
    method: &str,
    graph: &WeightedGraph,
    instance: String,
    seed: u64,
    output: SpinRunOutput,
    params: Value,
) -> RunRecord {
    RunRecord {
        method: method.to_string(),
        instance,
        num_vertices: graph.num_vertices(),
        total_weight: graph.total_weight(),
        seed,
        best_cut: output.best_cut,
        ising_energy: ising_energy(graph, &output.best_spins),
        optimum: None,
        approximation_ratio: None,
        sweeps: output.sweeps,
        history: output.history,
        spins: output.best_spins,
        angles: None,
        params,
    }
}

#[allow(unused_variables)]
fn run_solver(
    solver: &str,
    graph: &WeightedGraph,
    hyperparameters: &Option<Map<String, Value>>,
    instance: String,
) -> Result<RunRecord> {
    match solver {
        #[cfg(feature = "simulated_annealing")]
        "sa" => {
            use qiils_solvers::sa;
            let params = sa::Params::initialize(hyperparameters)?;
            let output = sa::solve_with_progress(graph, &params, &report_progress)?;
            Ok(spin_record(
                "sa",
                graph,
                instance,
                params.seed,
                output,
                serde_json::to_value(&params)?,
            ))
        }
        #[cfg(feature = "tabu_search")]
        "tabu" => {
            use qiils_solvers::tabu;
            let params = tabu::Params::initialize(hyperparameters)?;
            let output = tabu::solve_with_progress(graph, &params, &report_progress)?;
            Ok(spin_record(
                "tabu",
                graph,
                instance,
                params.seed,
                output,
                serde_json::to_value(&params)?,
            ))
        }
        #[cfg(feature = "qiils")]
        "qiils" => {
            use qiils_solvers::qiils;
            let params = qiils::Params::initialize(hyperparameters)?;
            let output = qiils::solve_with_progress(graph, &params, &report_progress)?;
            Ok(RunRecord {
                method: "qiils".to_string(),
                instance,
                num_vertices: graph.num_vertices(),
                total_weight: graph.total_weight(),
                seed: params.seed,
                best_cut: output.best_cut,
                ising_energy: ising_energy(graph, &output.best_spins),
                optimum: None,
                approximation_ratio: None,
                sweeps: output.sweeps,
                history: output.history,
                spins: output.best_spins,
                angles: Some(output.best_angles),
                params: serde_json::to_value(&params)?,
            })
        }
        _ => Err(anyhow!(
            "Solver '{}' is not available in this build",
            solver
        )),
    }
}

pub fn evaluate(
    graph_path: PathBuf,
    solution: String,
    format: GraphFormat,
    unweighted: bool,
) -> Result<()> {
    let graph = load_graph(&graph_path, format, !unweighted)?;
    let solution = load_solution(&solution)?;
    let evaluation = evaluate_solution(&graph, &solution)?;
    println!("{}", jsonify(&evaluation)?);
    Ok(())
}

pub fn generate(
    num_vertices: usize,
    degree: usize,
    seed: u64,
    unweighted: bool,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let graph = RandomRegular::new(num_vertices, degree, !unweighted).generate_instance(seed)?;
    let path = output_file
        .unwrap_or_else(|| PathBuf::from(instance_file_name(num_vertices, degree, seed, seed)));
    save_graph(&graph, &path, GraphFormat::Custom)?;
    log::info!(
        "generated {} with total weight {}",
        instance_name(num_vertices, degree, seed, seed),
        graph.total_weight()
    );
    println!("graph written to: {:?}", path);
    Ok(())
}

fn read_json_arg(arg: &str, what: &str) -> Result<String> {
    if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow!("Failed to read {} from stdin: {}", what, e))?;
        Ok(buffer)
    } else if arg.ends_with(".json") {
        fs::read_to_string(arg).map_err(|e| anyhow!("Failed to read {} file '{}': {}", what, arg, e))
    } else {
        Ok(arg.to_string())
    }
}

fn load_hyperparameters(params: Option<&str>) -> Result<Option<Map<String, Value>>> {
    match params {
        None => Ok(None),
        Some(params) => {
            let text = read_json_arg(params, "params")?;
            let map = dejsonify::<Map<String, Value>>(&text)
                .map_err(|e| anyhow!("Failed to parse params: {}", e))?;
            Ok(Some(map))
        }
    }
}

fn load_solution(solution: &str) -> Result<Solution> {
    let text = read_json_arg(solution, "solution")?;
    let map = dejsonify::<Map<String, Value>>(&text)
        .map_err(|e| anyhow!("Failed to parse solution: {}", e))?;
    Solution::try_from(map).map_err(|e| anyhow!("Failed to parse solution: {}", e))
}
