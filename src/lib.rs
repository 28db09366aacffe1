use anyhow::{bail, Context};
use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use crossbeam_channel::{bounded, Receiver, Sender};
use crossbeam_utils::sync::WaitGroup;
use log::info;
use std::collections::HashMap;
use std::io;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::thread;

pub mod encoder;
pub mod encoding;
pub mod error;
pub mod measures;
pub mod table;

pub use crate::encoder::{Encoder, DEFAULT_WORD_LENGTH};
pub use crate::error::EncoderError;
pub use crate::measures::{count_mismatches, within_k_mismatches};
pub use crate::table::{Code, CodeTable, MismatchMatrix, Odometer, MAX_WORD_LENGTH};

// The location of one pairwise comparison
#[derive(Clone, Debug, PartialEq)]
struct Pair {
    seq1_idx: usize,
    seq2_idx: usize,
}

// A batch of pairs for passing down a channel (between threads)
#[derive(Clone, Debug, PartialEq)]
struct Pairs {
    pairs: Vec<Pair>,
    idx: usize,
}

// One pair's result
#[derive(Clone, Debug, PartialEq)]
struct Mismatches {
    seq1_idx: usize,
    seq2_idx: usize,
    count: usize,
    within_k: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
struct Batch {
    results: Vec<Mismatches>,
    idx: usize,
}

pub fn cli() -> Command {
    Command::new("mmtable")
        .version(crate_version!())
        .about("Word encoding and mismatch lookup tables for ACGTN sequences")
        .arg(Arg::new("word-length")
            .short('w')
            .long("word-length")
            .value_parser(value_parser!(usize))
            .default_value("5")
            .help("Length of the words sequences are split into"))
        .arg(Arg::new("table")
            .long("table")
            .action(ArgAction::SetTrue)
            .conflicts_with("sequences")
            .help("Print every word in code order followed by the mismatch matrix, then exit"))
        .arg(Arg::new("max-mismatches")
            .short('k')
            .long("max-mismatches")
            .value_parser(value_parser!(usize))
            .help("Also report whether each pair is within this many mismatches"))
        .arg(Arg::new("threads")
            .short('t')
            .long("threads")
            .value_parser(value_parser!(usize))
            .default_value("1")
            .help("How many threads to spin up for pairwise comparisons"))
        .arg(Arg::new("batchsize")
            .short('b')
            .long("batchsize")
            .value_parser(value_parser!(usize))
            .default_value("1")
            .help("Number of pairs handed to a thread at a time"))
        .arg(Arg::new("sequences")
            .value_name("SEQUENCE")
            .num_args(2..)
            .required_unless_present("table")
            .help("Equal-length sequences over ACGTN, compared all against all"))
}

pub fn get_cli_arguments() -> ArgMatches {
    cli().get_matches()
}

#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    Table,
    Pairwise,
}

pub struct Setup {
    mode: Mode,
    encoder: Arc<Encoder>,
    sequences: Vec<Vec<Code>>,
    max_mismatches: Option<usize>,
    threads: usize,
    batchsize: usize,
    writer: BufWriter<Box<dyn io::Write + Send>>,
}

impl Setup {
    // Send the output somewhere other than stdout
    pub fn with_writer(mut self, writer: Box<dyn io::Write + Send>) -> Setup {
        self.writer = BufWriter::new(writer);
        self
    }
}

pub fn set_up(m: &ArgMatches) -> anyhow::Result<Setup> {
    let word_length = *m.get_one::<usize>("word-length").unwrap_or(&DEFAULT_WORD_LENGTH);

    let encoder = Encoder::new(word_length).context("could not build the lookup tables")?;

    let mode = if m.get_flag("table") {
        Mode::Table
    } else {
        Mode::Pairwise
    };

    // The sequences to compare, encoded up front
    let mut sequences: Vec<Vec<Code>> = Vec::new();
    if let Some(raw) = m.get_many::<String>("sequences") {
        for (i, s) in raw.enumerate() {
            let codes = encoder
                .encode(s)
                .with_context(|| format!("could not encode sequence {}", i + 1))?;
            if let Some(first) = sequences.first() {
                if first.len() != codes.len() {
                    return Err(EncoderError::Comparison {
                        left: first.len() * word_length,
                        right: s.len(),
                    })
                    .with_context(|| format!("sequence {} differs in length from sequence 1", i + 1));
                }
            }
            sequences.push(codes);
        }
    }

    if mode == Mode::Pairwise && sequences.len() < 2 {
        bail!("need at least two sequences to compare");
    }

    // batch size - to tune the workload per message so that threads aren't fighting over the pair channel as often
    let batchsize = (*m.get_one::<usize>("batchsize").unwrap_or(&1)).max(1);

    // How many additional threads to use for calculating mismatches - need at least 1.
    let threads = (*m.get_one::<usize>("threads").unwrap_or(&1)).max(1);

    Ok(Setup {
        mode,
        encoder: Arc::new(encoder),
        sequences,
        max_mismatches: m.get_one::<usize>("max-mismatches").copied(),
        threads,
        batchsize,
        writer: BufWriter::new(Box::new(io::stdout())),
    })
}

pub fn run(setup: Setup) -> io::Result<()> {
    match setup.mode {
        Mode::Table => {
            info!(
                "printing the {} word table for word length {}",
                setup.encoder.table().len(),
                setup.encoder.word_length()
            );
            let mut writer = setup.writer;
            write_table(&setup.encoder, &mut writer)?;
            writer.flush()
        }
        Mode::Pairwise => {
            info!(
                "comparing {} sequences all against all on {} thread(s)",
                setup.sequences.len(),
                setup.threads
            );
            load(setup)
        }
    }
}

// Every word in code order, one per line, then the matrix with one row per line
pub fn write_table<T: io::Write>(encoder: &Encoder, writer: &mut T) -> io::Result<()> {
    for word in encoder.table().words() {
        writer.write_all(word)?;
        writeln!(writer)?;
    }

    let matrix = encoder.matrix();
    for i in 0..matrix.size() as Code {
        let row: Vec<String> = matrix.row(i).iter().map(|c| c.to_string()).collect();
        writeln!(writer, "{}", row.join(" "))?;
    }

    Ok(())
}

pub fn load(setup: Setup) -> io::Result<()> {
    let arc = Arc::new(setup.sequences);
    let encoder = setup.encoder;

    let (pairs_sender, pairs_receiver) = bounded(100);
    let (results_sender, results_receiver) = bounded(100);

    let wg = WaitGroup::new();

    let n = arc.len();
    let batchsize = setup.batchsize;
    let max_mismatches = setup.max_mismatches;

    // We spin up a thread to write the output as it arrives down the results channel.
    let writer = setup.writer;
    let write = thread::spawn(move || gather_write(writer, max_mismatches.is_some(), results_receiver));

    thread::spawn(move || {
        generate_pairs_square(n, batchsize, pairs_sender);
    });

    // Spin up the threads that do the comparing
    for _i in 0..setup.threads {
        let wg = wg.clone();
        let arc = arc.clone();
        let encoder = encoder.clone();
        let receiver: Receiver<Pairs> = pairs_receiver.clone();
        let sender: Sender<Batch> = results_sender.clone();
        thread::spawn(move || {
            for message in receiver.iter() {
                let results = message
                    .pairs
                    .iter()
                    .map(|pair| {
                        let (s1, s2) = (&arc[pair.seq1_idx], &arc[pair.seq2_idx]);
                        Mismatches {
                            seq1_idx: pair.seq1_idx,
                            seq2_idx: pair.seq2_idx,
                            count: encoder.count_encoded_mismatches(s1, s2),
                            within_k: max_mismatches.map(|k| encoder.within_k_encoded_mismatches(s1, s2, k)),
                        }
                    })
                    .collect();

                // the writer has gone away, nothing left to do
                if sender.send(Batch { results, idx: message.idx }).is_err() {
                    break;
                }
            }
            drop(wg);
        });
    }

    // When all the pairs have been compared, we can drop the sending end of the results channel
    drop(pairs_receiver);
    wg.wait();
    drop(results_sender);

    // Joins when all the pairwise comparisons have been written, and then we're done.
    write
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "writer thread panicked"))?
}

// Given the number of sequences, generate all possible pairwise comparisons
// between them, and pass them down a channel in batches of `size`.
fn generate_pairs_square(n: usize, size: usize, sender: Sender<Pairs>) {
    // this counter is sent down the channel in order to later retain input order in the output
    let mut idx_counter: usize = 0;

    let mut pair_vec: Vec<Pair> = Vec::with_capacity(size);

    for i in 0..n.saturating_sub(1) {
        for j in i + 1..n {
            pair_vec.push(Pair {
                seq1_idx: i,
                seq2_idx: j,
            });

            // when we reach the batch size, we send this batch of pairs
            if pair_vec.len() == size {
                let pairs = std::mem::replace(&mut pair_vec, Vec::with_capacity(size));
                if sender.send(Pairs { pairs, idx: idx_counter }).is_err() {
                    return;
                }
                idx_counter += 1;
            }
        }
    }

    // send the last batch
    if !pair_vec.is_empty() {
        let _ = sender.send(Pairs {
            pairs: pair_vec,
            idx: idx_counter,
        });
    }
}

// Write the results as they arrive. Uses a hashmap whose keys are batch indices to write the results in the
// order they are produced by generate_pairs_square()
fn gather_write<T: io::Write>(mut writer: T, with_k: bool, rx: Receiver<Batch>) -> io::Result<()> {
    if with_k {
        writeln!(writer, "sequence1\tsequence2\tmismatches\twithin_k")?;
    } else {
        writeln!(writer, "sequence1\tsequence2\tmismatches")?;
    }

    let mut m: HashMap<usize, Batch> = HashMap::new();

    let mut counter: usize = 0;

    for r in rx.iter() {
        m.insert(r.idx, r);
        while let Some(batch) = m.remove(&counter) {
            for result in batch.results {
                write!(writer, "seq{}\tseq{}\t{}", result.seq1_idx + 1, result.seq2_idx + 1, result.count)?;
                match result.within_k {
                    Some(w) => writeln!(writer, "\t{}", w)?,
                    None => writeln!(writer)?,
                }
            }
            counter += 1;
        }
    }

    writer.flush()?;

    Ok(())
}
