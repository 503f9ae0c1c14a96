use rigctl::registry;
use rigctl::Rig;

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Models");
    println!("=========================================");

    for caps in registry::models() {
        println!();
        println!("Model {} ({} {})", caps.model, caps.mfg_name, caps.model_name);
        println!("=========================================");
        println!("version:      {}", caps.version);
        println!("status:       {}", caps.status);
        println!("port:         {:?}", caps.port_type);
        println!("vfos:         {:?}", caps.vfos);
        println!("modes:        {:?}", caps.modes);
        println!("get levels:   {:?}", caps.get_levels);
        println!("set levels:   {:?}", caps.set_levels);
        println!("funcs:        {:?}", caps.funcs);
        println!("shared osc:   {}", caps.shared_oscillator);

        let rig = Rig::new(caps.model)?;
        println!("itu region:   {}", rig.itu_region());
        for p in rig.conf_params() {
            println!(
                "  {:<18} {}  {:?}  default={:?}{}{}",
                p.name,
                p.token,
                p.kind,
                p.default,
                if p.required { " required" } else { "" },
                if p.live { " live" } else { "" },
            );
        }
    }

    Ok(())
}
