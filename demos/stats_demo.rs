use chain_hash::DefaultHashBuilder;
use chain_hash::HashMap;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    /// Number of keys to insert.
    #[arg(short = 'c', long = "count", default_value_t = 20_000)]
    count: u64,

    /// Remove every n-th key after filling. Zero disables removal.
    #[arg(short = 'r', long = "remove_every", default_value_t = 0)]
    remove_every: u64,
}

fn main() {
    let args = Args::parse();

    let mut map: HashMap<u64, u64, DefaultHashBuilder> = HashMap::new();
    println!(
        "Filling map with {} keys over {} buckets...",
        args.count,
        map.bucket_count()
    );

    for key in 0..args.count {
        if !map.insert(key, key.wrapping_mul(31)) {
            panic!("Key already exists in map: {key}");
        }
    }

    if args.remove_every > 0 {
        let mut removed = 0;
        for key in (0..args.count).step_by(args.remove_every as usize) {
            if map.remove(&key).is_some() {
                removed += 1;
            }
        }
        println!("Removed {removed} keys");
    }

    println!(
        "Map holds {} entries in {} occupied buckets",
        map.len(),
        map.occupied_buckets()
    );

    map.print_chain_histogram();
    map.debug_stats().print();
}
