use clap::Parser;

use rigctl::locator;
use rigctl::misc::format_freq;
use rigctl::status_to_string;
use rigctl::Channel;
use rigctl::Level;
use rigctl::Mode;
use rigctl::Rig;
use rigctl::Token;
use rigctl::Vfo;

#[derive(Parser, Debug)]
#[clap(version)]
struct Args {
    /// Session settings, `model` selects the rig
    #[clap(short, long, default_value = "model=dummy, rig_pathname=/dev/Rig, retry=5")]
    args: String,
    /// Locators to compare
    #[clap(long, num_args = 2, default_values = ["IN98XC", "DM33DX"])]
    locators: Vec<String>,
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Args::parse();

    let mut rig = Rig::from_args(cli.args.as_str())?;
    rig.open()?;

    let region = rig.get_conf(Token::from_raw(1073741944))?;
    let path = rig.get_conf("rig_pathname")?;
    let retry = rig.get_conf("retry")?;
    println!("status(str):      {}", status_to_string(rig.status_code()));
    println!("get_conf:         path = {path}, retry = {retry}, ITU region = {region}");

    rig.set_freq(Vfo::B, 5_700_000_000.0)?;
    rig.set_vfo(Vfo::B)?;
    println!("freq:             {}", format_freq(rig.get_freq(Vfo::Current)?));
    rig.set_freq(Vfo::A, 145_550_000.0)?;

    let (mode, width) = rig.get_mode(Vfo::Current)?;
    println!("mode:             {mode}\nbandwidth:        {width}");
    rig.set_mode(Vfo::Current, Mode::CW, rigctl::PASSBAND_NORMAL)?;
    let (mode, width) = rig.get_mode(Vfo::Current)?;
    println!("mode:             {mode}\nbandwidth:        {width}");

    let caps = rig.caps();
    println!("ITU region:       {}", rig.itu_region());
    println!("Model:            {}", caps.model_name);
    println!("Manufacturer:     {}", caps.mfg_name);
    println!("Backend version:  {}", caps.version);
    println!("Backend license:  {}", caps.copyright);
    println!("Rig info:         {}", rig.get_info()?);

    rig.set_level("VOX", 1)?;
    println!("VOX level:        {}", rig.get_level("VOX")?);
    rig.set_level(Level::Vox, 5)?;
    println!("VOX level:        {}", rig.get_level(Level::Vox)?);
    println!("strength:         {}", rig.get_level(Level::Strength)?);
    println!("status:           {}", rig.status_code());
    println!("status(str):      {}", status_to_string(rig.status_code()));

    let mut chan = Channel::new(Vfo::B);
    let _ = rig.get_channel(&mut chan);
    println!("get_channel status: {}", rig.status_code());
    println!("VFO:              {}, {}", chan.vfo, format_freq(chan.freq));

    println!("\nSending Morse, '73'");
    rig.send_morse(Vfo::A, "73")?;

    rig.close()?;

    println!("\nSome static functions:");
    let (loc1, loc2) = (&cli.locators[0], &cli.locators[1]);
    let (lon1, lat1) = locator::locator2longlat(loc1)?;
    let (lon2, lat2) = locator::locator2longlat(loc2)?;
    let pairs = (loc1.len() / 2).max(1);
    println!(
        "Loc1:  {loc1} -> {lon1:9.4}, {lat1:9.4} -> {}",
        locator::longlat2locator(lon1, lat1, pairs)?
    );
    println!(
        "Loc2:  {loc2} -> {lon2:9.4}, {lat2:9.4} -> {}",
        locator::longlat2locator(lon2, lat2, (loc2.len() / 2).max(1))?
    );

    let (dist, az) = locator::qrb(lon1, lat1, lon2, lat2)?;
    println!(
        "Distance: {dist:.3} km, azimuth {az:.2}, long path: {:.3} km, azimuth {:.2}",
        locator::distance_long_path(dist),
        locator::azimuth_long_path(az)
    );

    let coords = [("Longitude", lon1, ('E', 'W')), ("Latitude", lat1, ('N', 'S'))];
    for (label, value, (pos, neg)) in coords {
        let (deg, min, sec, negative) = locator::dec2dms(value)?;
        println!(
            "{label}: {value:4.4}, {deg:4}° {min:2}' {sec:2.0}\" {}\trecoded: {:9.4}",
            if negative { neg } else { pos },
            locator::dms2dec(deg, min, sec, negative)
        );
    }

    Ok(())
}
