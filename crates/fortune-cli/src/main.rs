use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fortune_core::{
	load_data_table_from_path, load_paths_with_options, parse_probability_args, write_index_for,
	FileSystemTree, LengthFilter, LoadOptions, NodeId, NodeKind,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "fortune-tree", version, about = "Inspect fortune corpora and their indexes")]
struct Cli {
	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Load fortune files and directories into a weighted tree
	Load {
		/// Paths, each optionally preceded by a share such as `30%`
		#[arg(required = true, num_args = 1..)]
		paths: Vec<String>,
		/// Drop files whose shortest quotation is above this length (0 = off)
		#[arg(long, default_value_t = 0)]
		shorter_than: u32,
		/// Drop files whose longest quotation is below this length (0 = off)
		#[arg(long, default_value_t = 0)]
		longer_than: u32,
		/// Validate directory entries in parallel
		#[arg(long)]
		parallel: bool,
		/// Print the tree as JSON
		#[arg(long)]
		json: bool,
	},
	/// Show the header of a `.dat` index
	Inspect {
		/// Path to the index file
		index: PathBuf,
	},
	/// Build the `.dat` index for a quotation file
	Index {
		/// Quotation file
		file: PathBuf,
		/// Delimiter character between quotations
		#[arg(long, default_value_t = '%')]
		delimiter: char,
	},
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	let level = match cli.verbose {
		0 => Level::WARN,
		1 => Level::INFO,
		2 => Level::DEBUG,
		_ => Level::TRACE,
	};
	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_writer(std::io::stderr)
		.init();

	match cli.command {
		Commands::Load { paths, shorter_than, longer_than, parallel, json } => {
			let requests = parse_probability_args(&paths)?;
			let options = LoadOptions {
				filter: LengthFilter::new(shorter_than, longer_than),
				parallel_validation: parallel,
			};

			let tree = load_paths_with_options(&requests, &options)
				.context("Failed to load fortune paths")?;

			if json {
				println!("{}", tree.to_json()?);
			} else {
				print_node(&tree, FileSystemTree::ROOT, 0);
			}
		}
		Commands::Inspect { index } => {
			let table = load_data_table_from_path(&index)
				.with_context(|| format!("Failed to read index {}", index.display()))?;

			println!("📋 Index: {}", index.display());
			println!("- Version: {}", table.version);
			println!("- Quotations: {}", table.number_of_strings);
			println!("- Longest: {} bytes", table.longest_length);
			println!("- Shortest: {} bytes", table.shortest_length);
			println!(
				"- Flags: 0x{:x} (random: {}, ordered: {}, rotated: {})",
				table.flags,
				table.is_random(),
				table.is_ordered(),
				table.is_rotated()
			);
			println!("- Delimiter: {:?}", table.delimiter as char);
		}
		Commands::Index { file, delimiter } => {
			if !delimiter.is_ascii() {
				anyhow::bail!("Delimiter must be a single ASCII character, got {:?}", delimiter);
			}
			let table = write_index_for(&file, delimiter as u8)
				.with_context(|| format!("Failed to index {}", file.display()))?;

			println!("✅ Indexed {}", file.display());
			println!(
				"📈 {} quotations, {}-{} bytes",
				table.number_of_strings, table.shortest_length, table.longest_length
			);
		}
	}
	Ok(())
}

fn print_node(tree: &FileSystemTree, id: NodeId, depth: usize) {
	let Some(node) = tree.get(id) else {
		return;
	};
	let indent = "  ".repeat(depth);

	match node.kind {
		NodeKind::Root => println!(
			"🌳 {:.1}%: {} quotations in {} files",
			node.percent, node.num_entries, node.num_files
		),
		NodeKind::Directory => println!(
			"{}📂 {} {:.1}%: {} quotations in {} files",
			indent,
			node.path.display(),
			node.percent,
			node.num_entries,
			node.num_files
		),
		NodeKind::File => {
			let (shortest, longest) = node
				.table
				.as_ref()
				.map(|t| (t.shortest_length, t.longest_length))
				.unwrap_or_default();
			println!(
				"{}📄 {} {:.1}%: {} quotations, {}-{} bytes",
				indent,
				node.path.display(),
				node.percent,
				node.num_entries,
				shortest,
				longest
			);
		}
	}

	for child in &node.children {
		print_node(tree, *child, depth + 1);
	}
}
