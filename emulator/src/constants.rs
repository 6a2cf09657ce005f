pub type Word = u32;
pub type SignedWord = i32;
pub type Address = u32;

/// Width of a machine word, in bits
pub const BITWIDTH: u32 = Word::BITS;

/// Number of general purpose registers
pub const NUM_REGS: usize = 32;

/// Size of a memory word, in bytes
pub const WORD_SIZE: u32 = 4;

/// Size of an encoded instruction, in bytes
pub const INSTRUCTION_WIDTH: Word = 4;

/// Number of stages of the pipeline driving the components
pub const PIPELINE_STAGES: usize = 5;

/// Default start of the instruction memory
pub const IMEM_START: Address = 0x8000_0000;

/// Default size of the instruction memory (64 KiB)
pub const IMEM_SIZE: u32 = 64 * 1024;

/// Default start of the data memory
pub const DMEM_START: Address = 0x8001_0000;

/// Default size of the data memory (64 KiB)
pub const DMEM_SIZE: u32 = 64 * 1024;

/// Number of lanes in a packed vector word
pub const LANES: usize = 3;

/// Width of a single vector lane, in bits
pub const LANE_BITS: u32 = 10;

/// Mask of a single vector lane once shifted down
pub const LANE_MASK: Word = (1 << LANE_BITS) - 1;

/// Bit offsets of the lanes, indexed by lane number
pub const LANE_SHIFTS: [u32; LANES] = [0, LANE_BITS, 2 * LANE_BITS];

/// Width of a raw colour channel, in bits
pub const CHANNEL_BITS: u32 = 8;

/// Largest value a raw colour channel can hold
pub const CHANNEL_MAX: Word = (1 << CHANNEL_BITS) - 1;

/// Fixed-point shift applied after a lane multiplication
pub const FIXED_POINT_SHIFT: u32 = 8;

/// Discarded fraction at or above which a lane product is rounded up
pub const ROUNDING_THRESHOLD: Word = 1 << (FIXED_POINT_SHIFT - 1);
