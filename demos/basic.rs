use concurrent_heavykeeper::{Config, TopK};

fn main() -> Result<(), concurrent_heavykeeper::TopKError> {
    // Create a new TopK with:
    // - k=3 (number of top items to track)
    // - width=1000 (buckets per row, larger values use more memory but reduce collisions)
    // - depth=4 (number of rows, more depth increases accuracy but uses more CPU)
    // - decay=0.9 (base of the probability that a colliding counter loses a unit)
    // - seed=42 (selects the hash family)
    // - workers=2 (ingestion threads)
    let topk = TopK::new(Config::new(3, 1000, 4, 0.9, 42, 2))?;

    let stream = [
        ("frequent item", 5),
        ("less frequent item", 3),
        ("rare item", 1),
        ("very rare item", 1),
    ];
    for (item, times) in stream {
        for _ in 0..times {
            topk.add(item)?;
        }
    }

    // results are only complete once every queued item has been applied
    topk.drain();

    println!("Top items and their frequencies:");
    for node in topk.list() {
        println!("{}: {}", String::from_utf8_lossy(&node.item), node.count);
    }

    let item = "frequent item";
    println!("\nCount for '{}': {:?}", item, topk.count(item));
    println!(
        "Is '{}' in top-k? {}",
        item,
        if topk.contains(item) { "yes" } else { "no" }
    );
    Ok(())
}
