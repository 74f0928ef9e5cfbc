use ordered_skiplist::{Config, Descending, SkipListMap};

use log::info;
use slab::Slab;

fn main() -> ordered_skiplist::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let config = Config::default().with_seed(432112);
    let mut map: SkipListMap<u32, u32> =
        SkipListMap::with_config(config, Default::default(), Slab::new())?;

    for key in (1..=50).rev() {
        map.insert(key, key * key);
        println!("{}", map);
    }

    let key = 3;
    println!("{:?}", map.get(&key));
    println!("{:?}", map.remove(&key));
    println!("{:?}", map.at(&key));
    println!("{}", map);
    info!("{} entries over {} levels", map.len(), map.height());

    let reversed: SkipListMap<u32, u32, Descending> = map.into_iter().collect();
    println!("{}", reversed);

    let mut cursor = reversed.find(&10);
    while !cursor.is_end() {
        let (key, value) = cursor.key_value()?;
        println!("{} -> {}", key, value);
        cursor.move_next()?;
    }

    Ok(())
}
